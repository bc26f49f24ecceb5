//! Generation Client interface
//!
//! The pipeline talks to the generative service only through [`LlmClient`],
//! injected at construction. One call to `generate` is one outbound request;
//! implementations must not retry or cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::prompt_builder::TripPrompt;

/// A generative service that returns schema-constrained JSON text
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the instruction and schema, return the raw structured text
    async fn generate(&self, prompt: &TripPrompt) -> Result<String, GenerationError>;
}

/// Replays a fixed payload instead of calling a service
///
/// Used for offline runs (`--replay`) and tests. Records every prompt it
/// receives.
#[derive(Debug)]
pub struct CannedLlmClient {
    response: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<TripPrompt>>,
}

impl CannedLlmClient {
    /// Always answer with `payload`
    pub fn ok(payload: impl Into<String>) -> Self {
        Self::with_response(Ok(payload.into()))
    }

    /// Always fail as if the transport broke
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_response(Err(message.into()))
    }

    fn with_response(response: Result<String, String>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<TripPrompt> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for CannedLlmClient {
    async fn generate(&self, prompt: &TripPrompt) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        match &self.response {
            Ok(payload) => Ok(payload.clone()),
            Err(message) => Err(GenerationError::InvalidResponse(message.clone())),
        }
    }
}
