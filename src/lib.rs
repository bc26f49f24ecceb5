//! LLM-generated strategy itineraries
//!
//! A caller names an origin and a destination from the reference catalog plus
//! a requester profile, and gets back up to three ranked itineraries: ordered
//! steps through intermediate catalog nodes, each with a rationale, a
//! provider label, a short code and synthetic times.
//!
//! ## Architecture
//!
//! ```text
//! TripRequest → PromptBuilder → LlmClient → normalizer → Enricher → Vec<Itinerary>
//! ```
//!
//! The generative service sits behind [`LlmClient`]; [`GeminiClient`] is the
//! production implementation. Everything else is pure and deterministic given
//! an explicit time baseline.

pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod gemini;
pub mod llm_client;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod profile;
pub mod prompt_builder;

// Re-exports for convenience
pub use catalog::{Catalog, Category, ConceptNode};
pub use config::GenerationConfig;
pub use enrichment::{Enricher, TimeSchedule, DEFAULT_PROVIDERS};
pub use error::{ConfigError, GenerationError};
pub use gemini::GeminiClient;
pub use llm_client::{CannedLlmClient, LlmClient};
pub use model::{Itinerary, Step, UNKNOWN_CODE};
pub use pipeline::{ItineraryPipeline, PipelineOutcome, PipelineReport, PipelineStage};
pub use profile::{RequesterProfile, TripRequest};
pub use prompt_builder::{PromptBuilder, TripPrompt};
