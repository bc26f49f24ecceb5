//! Pipeline Facade
//!
//! One call runs build → generate → normalize → enrich and returns the
//! ordered itineraries. Failures never reach the caller: any unrecoverable
//! stage error ends the run with an empty list. [`ItineraryPipeline::run_detailed`]
//! exposes why a run came back empty for callers that need to tell
//! "no itineraries" apart from "service failed".

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::enrichment::Enricher;
use crate::llm_client::LlmClient;
use crate::model::Itinerary;
use crate::normalizer;
use crate::profile::TripRequest;
use crate::prompt_builder::PromptBuilder;

/// Stages of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Building,
    Generating,
    Normalizing,
    Enriching,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Building => "building",
            PipelineStage::Generating => "generating",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Enriching => "enriching",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    GenerationFailed(String),
    MalformedOutput(String),
}

impl PipelineOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Completed => "completed",
            PipelineOutcome::GenerationFailed(_) => "generation_failed",
            PipelineOutcome::MalformedOutput(_) => "malformed_output",
        }
    }
}

/// Result of one run, with diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub itineraries: Vec<Itinerary>,
    pub outcome: PipelineOutcome,
    /// Last stage entered before the run finished
    pub last_stage: PipelineStage,
    /// Itinerary records dropped by the normalizer
    pub rejected_records: usize,
}

impl PipelineReport {
    fn failed(outcome: PipelineOutcome, last_stage: PipelineStage) -> Self {
        Self {
            itineraries: Vec::new(),
            outcome,
            last_stage,
            rejected_records: 0,
        }
    }
}

/// Stateless orchestrator; safe to share across concurrent searches
#[derive(Clone)]
pub struct ItineraryPipeline {
    client: Arc<dyn LlmClient>,
    builder: PromptBuilder,
    enricher: Enricher,
}

impl ItineraryPipeline {
    pub fn new(client: Arc<dyn LlmClient>, catalog: Arc<Catalog>) -> Self {
        Self {
            client,
            builder: PromptBuilder::new(Arc::clone(&catalog)),
            enricher: Enricher::new(catalog),
        }
    }

    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    /// Run with the local wall clock as the time baseline
    pub async fn run(&self, request: &TripRequest) -> Vec<Itinerary> {
        self.run_at(request, Local::now().naive_local()).await
    }

    /// Run with an explicit time baseline
    pub async fn run_at(
        &self,
        request: &TripRequest,
        generated_at: NaiveDateTime,
    ) -> Vec<Itinerary> {
        self.run_detailed(request, generated_at).await.itineraries
    }

    pub async fn run_detailed(
        &self,
        request: &TripRequest,
        generated_at: NaiveDateTime,
    ) -> PipelineReport {
        let mut stage = PipelineStage::Idle;
        let report = self.execute(request, generated_at, &mut stage).await;
        enter(&mut stage, PipelineStage::Done);

        match &report.outcome {
            PipelineOutcome::Completed => info!(
                outcome = report.outcome.label(),
                origin = %request.origin.name,
                destination = %request.destination.name,
                itineraries = report.itineraries.len(),
                rejected = report.rejected_records,
                "Itinerary search finished"
            ),
            PipelineOutcome::GenerationFailed(reason)
            | PipelineOutcome::MalformedOutput(reason) => {
                warn!(
                    outcome = report.outcome.label(),
                    failed_stage = %report.last_stage,
                    origin = %request.origin.name,
                    destination = %request.destination.name,
                    reason = %reason,
                    "Itinerary search returned no results"
                )
            }
        }

        report
    }

    async fn execute(
        &self,
        request: &TripRequest,
        generated_at: NaiveDateTime,
        stage: &mut PipelineStage,
    ) -> PipelineReport {
        enter(stage, PipelineStage::Building);
        let prompt = self
            .builder
            .build(&request.origin, &request.destination, &request.profile);

        enter(stage, PipelineStage::Generating);
        let raw = match self.client.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                return PipelineReport::failed(
                    PipelineOutcome::GenerationFailed(e.to_string()),
                    *stage,
                )
            }
        };

        enter(stage, PipelineStage::Normalizing);
        let normalized = match normalizer::normalize_report(&raw) {
            Ok(report) => report,
            Err(e) => {
                return PipelineReport::failed(
                    PipelineOutcome::MalformedOutput(e.to_string()),
                    *stage,
                )
            }
        };
        let candidates = normalizer::anchor_endpoints(
            normalized.candidates,
            &request.origin,
            &request.destination,
        );

        enter(stage, PipelineStage::Enriching);
        let itineraries = self.enricher.enrich(candidates, generated_at);

        PipelineReport {
            itineraries,
            outcome: PipelineOutcome::Completed,
            last_stage: *stage,
            rejected_records: normalized.rejected.len(),
        }
    }
}

fn enter(stage: &mut PipelineStage, next: PipelineStage) {
    debug!(from = %stage, to = %next, "Pipeline stage transition");
    *stage = next;
}
