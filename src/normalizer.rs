//! Response Normalizer
//!
//! Recovers itinerary candidates from raw generator text. Whole-payload
//! failures yield an empty batch; each record is then validated on its own
//! into a [`RecordOutcome`], so one bad itinerary never takes its siblings
//! down with it. Defective fields are coerced to the sentinels in
//! [`crate::model`] instead of being rejected.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::catalog::ConceptNode;
use crate::error::{NormalizeError, RejectReason};
use crate::model::{synthesized_id, ItineraryCandidate, StepCandidate, DEFAULT_PRICE};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("number regex is valid"));

/// Minimal shape the payload must have before records are inspected
static ENVELOPE: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    jsonschema::validator_for(&json!({
        "type": "object",
        "required": ["itineraries"],
        "properties": {
            "itineraries": { "type": "array" }
        }
    }))
    .expect("envelope schema is valid")
});

/// Result of validating one itinerary record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Ok(ItineraryCandidate),
    Reject { index: usize, reason: RejectReason },
}

/// Candidates plus the records that were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub candidates: Vec<ItineraryCandidate>,
    pub rejected: Vec<(usize, RejectReason)>,
}

/// Normalize raw generator text, returning an empty list on any
/// whole-payload failure
pub fn normalize(raw: &str) -> Vec<ItineraryCandidate> {
    match normalize_report(raw) {
        Ok(report) => report.candidates,
        Err(e) => {
            warn!(error = %e, "Discarding unparseable generator payload");
            Vec::new()
        }
    }
}

/// Normalize raw generator text with per-record rejection details
pub fn normalize_report(raw: &str) -> Result<NormalizeReport, NormalizeError> {
    let payload = parse_payload(raw)?;

    let records = payload
        .get("itineraries")
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizeError::Envelope("itineraries is not an array".to_string()))?;

    let mut report = NormalizeReport::default();
    for (index, record) in records.iter().enumerate() {
        match validate_record(index, record) {
            RecordOutcome::Ok(candidate) => report.candidates.push(candidate),
            RecordOutcome::Reject { index, reason } => {
                warn!(index, reason = %reason, "Dropping itinerary record");
                report.rejected.push((index, reason));
            }
        }
    }

    assign_unique_ids(&mut report.candidates);

    debug!(
        kept = report.candidates.len(),
        rejected = report.rejected.len(),
        "Normalized generator payload"
    );

    Ok(report)
}

fn parse_payload(raw: &str) -> Result<Value, NormalizeError> {
    let text = strip_code_fence(raw);
    let payload: Value =
        serde_json::from_str(text).map_err(|e| NormalizeError::NotJson(e.to_string()))?;

    let errors: Vec<String> = ENVELOPE
        .iter_errors(&payload)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if !errors.is_empty() {
        return Err(NormalizeError::Envelope(errors.join("; ")));
    }

    Ok(payload)
}

/// Take the body of the first Markdown code fence, if any
///
/// Prose before or after the fence is discarded, as is a language tag on
/// the opening fence line.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some((_, rest)) = text.split_once("```") else {
        return text;
    };
    let body = rest.split_once("```").map_or(rest, |(body, _)| body);

    let body = match body.split_once('\n') {
        Some((tag, content)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => content,
        _ => body,
    };
    body.trim()
}

/// Validate and coerce a single itinerary record
///
/// The candidate id is left as supplied (possibly empty); uniqueness is
/// settled across the batch afterwards.
pub fn validate_record(index: usize, record: &Value) -> RecordOutcome {
    let Some(object) = record.as_object() else {
        return RecordOutcome::Reject {
            index,
            reason: RejectReason::NotAnObject,
        };
    };

    let steps = match object.get("segments").and_then(Value::as_array) {
        None => {
            return RecordOutcome::Reject {
                index,
                reason: RejectReason::MissingSteps,
            }
        }
        Some(steps) if steps.is_empty() => {
            return RecordOutcome::Reject {
                index,
                reason: RejectReason::EmptySteps,
            }
        }
        Some(steps) => steps,
    };

    let id = match object.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    RecordOutcome::Ok(ItineraryCandidate {
        id,
        price: coerce_price(object.get("price")),
        total_duration: string_field(object, "totalDuration"),
        tags: coerce_tags(object.get("tags")),
        summary: string_field(object, "summary"),
        steps: steps.iter().map(coerce_step).collect(),
    })
}

fn coerce_step(value: &Value) -> StepCandidate {
    match value {
        Value::Object(step) => StepCandidate {
            node_name: text_field(step, "city"),
            function: text_field(step, "marketingFunction"),
            rationale: string_field(step, "marketingTask"),
            duration: string_field(step, "duration"),
        },
        // A bare string is taken as the node name
        Value::String(name) => StepCandidate {
            node_name: name.trim().to_string(),
            function: String::new(),
            rationale: String::new(),
            duration: String::new(),
        },
        _ => StepCandidate {
            node_name: String::new(),
            function: String::new(),
            rationale: String::new(),
            duration: String::new(),
        },
    }
}

/// String values only; node names and labels are never rendered from numbers
fn text_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn coerce_tags(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Numbers pass through as-is (including non-positive ones), numeric
/// strings like "$12,500" are parsed, anything else becomes
/// [`DEFAULT_PRICE`].
pub fn coerce_price(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .unwrap_or(DEFAULT_PRICE),
        Some(Value::String(s)) => NUMBER
            .find(s)
            .and_then(|m| Decimal::from_str(&m.as_str().replace(',', "")).ok())
            .unwrap_or(DEFAULT_PRICE),
        _ => DEFAULT_PRICE,
    }
}

fn assign_unique_ids(candidates: &mut [ItineraryCandidate]) {
    let mut used = HashSet::new();
    for (index, candidate) in candidates.iter_mut().enumerate() {
        if candidate.id.is_empty() || used.contains(&candidate.id) {
            let base = synthesized_id(index);
            let mut id = base.clone();
            let mut n = 2;
            while used.contains(&id) {
                id = format!("{}-{}", base, n);
                n += 1;
            }
            debug!(index, id = %id, "Synthesized itinerary id");
            candidate.id = id;
        }
        used.insert(candidate.id.clone());
    }
}

/// Make every candidate start at `origin` and end at `destination`
///
/// Missing endpoints are inserted; existing steps are never reordered or
/// removed.
pub fn anchor_endpoints(
    candidates: Vec<ItineraryCandidate>,
    origin: &ConceptNode,
    destination: &ConceptNode,
) -> Vec<ItineraryCandidate> {
    candidates
        .into_iter()
        .map(|mut candidate| {
            if candidate.steps.first().map(|s| s.node_name.as_str()) != Some(origin.name.as_str())
            {
                debug!(id = %candidate.id, "Prepending origin step");
                candidate.steps.insert(0, endpoint_step(origin, "Starting point"));
            }
            if candidate.steps.len() < 2
                || candidate.steps.last().map(|s| s.node_name.as_str())
                    != Some(destination.name.as_str())
            {
                debug!(id = %candidate.id, "Appending destination step");
                candidate.steps.push(endpoint_step(destination, "Destination"));
            }
            candidate
        })
        .collect()
}

fn endpoint_step(node: &ConceptNode, role: &str) -> StepCandidate {
    StepCandidate {
        node_name: node.name.clone(),
        function: node.function.clone(),
        rationale: format!("{}: {}", role, node.function),
        duration: String::new(),
    }
}
