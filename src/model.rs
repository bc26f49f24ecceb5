//! Domain model
//!
//! Candidates are what the normalizer recovers from generator output.
//! `Itinerary` and `Step` are the enriched, final shapes handed to callers.
//! Sentinel values used when data cannot be recovered are defined here once.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Short code for nodes missing from the catalog
pub const UNKNOWN_CODE: &str = "UNK";

/// Price used when the generator omits one or sends something non-numeric
pub const DEFAULT_PRICE: Decimal = Decimal::ZERO;

/// Identifier for the itinerary at `index` when the generator supplies none
pub fn synthesized_id(index: usize) -> String {
    format!("itinerary-{}", index + 1)
}

/// A step as recovered from generator output, before enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCandidate {
    pub node_name: String,
    pub function: String,
    /// Why this stop is on the route
    pub rationale: String,
    pub duration: String,
}

/// An itinerary as recovered from generator output, before enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryCandidate {
    pub id: String,
    pub price: Decimal,
    pub total_duration: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub steps: Vec<StepCandidate>,
}

/// One waypoint of an enriched itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(rename = "city")]
    pub node_name: String,
    #[serde(rename = "marketingFunction")]
    pub function: String,
    pub code: String,
    #[serde(rename = "marketingTask")]
    pub rationale: String,
    pub duration: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub departure_at: NaiveDateTime,
    pub arrival_at: NaiveDateTime,
}

impl Step {
    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_CODE
    }
}

/// A complete generated strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: String,
    pub provider: String,
    pub price: Decimal,
    pub total_duration: String,
    #[serde(rename = "segments")]
    pub steps: Vec<Step>,
    pub tags: Vec<String>,
    pub summary: String,
}

impl Itinerary {
    pub fn origin(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn destination(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Intermediate steps, excluding origin and destination
    pub fn layovers(&self) -> &[Step] {
        if self.steps.len() <= 2 {
            &[]
        } else {
            &self.steps[1..self.steps.len() - 1]
        }
    }

    pub fn stop_count(&self) -> usize {
        self.layovers().len()
    }

    pub fn is_direct(&self) -> bool {
        self.stop_count() == 0
    }

    /// e.g. "JFK → LHR → SFO"
    pub fn route_codes(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.code.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }

    /// Whole-dollar USD rendering, e.g. "$12,500"
    pub fn formatted_price(&self) -> String {
        format_usd(self.price)
    }
}

fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(0);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
