//! Error types for the itinerary pipeline
//!
//! Each stage owns a `thiserror` enum. Only configuration errors are fatal;
//! everything else is recovered inside the pipeline and surfaces to callers
//! as an empty or partial itinerary list.

use thiserror::Error;

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API key configured: set GEMINI_API_KEY (or API_KEY)")]
    MissingApiKey,

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Provider list must not be empty")]
    NoProviders,

    #[error("Invalid time schedule: {0}")]
    Schedule(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure arm of a generation call
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generative service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from generative service: {0}")]
    InvalidResponse(String),

    #[error("Failed to decode service response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reference catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate concept node '{0}'")]
    DuplicateNode(String),

    #[error("Concept node '{0}' has no short code")]
    MissingCode(String),

    #[error("Catalog contains no concept nodes")]
    Empty,
}

/// Whole-payload normalization failures
///
/// Either of these yields an empty batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Payload is not JSON: {0}")]
    NotJson(String),

    #[error("Payload does not match the itinerary envelope: {0}")]
    Envelope(String),
}

/// Why a single itinerary record was discarded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("itinerary record is not a JSON object")]
    NotAnObject,

    #[error("itinerary has no segments array")]
    MissingSteps,

    #[error("itinerary segments array is empty")]
    EmptySteps,
}

/// Errors from resolving a trip request against the catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Unknown concept node '{0}'")]
    UnknownNode(String),

    #[error("Profile field '{0}' must not be empty")]
    EmptyProfileField(&'static str),
}
