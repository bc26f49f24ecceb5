//! Google Gemini API Client
//!
//! [`LlmClient`] implementation that calls `generateContent` with a JSON
//! response schema, so the model returns structured output rather than prose.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::config::GenerationConfig;
use crate::error::{ConfigError, GenerationError};
use crate::llm_client::LlmClient;
use crate::prompt_builder::TripPrompt;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GenerationConfig,
    client: Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_json_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GenerationConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ConfigError::HttpClient)?;

        let base_url = parse_base_url(DEFAULT_BASE_URL)?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(GenerationConfig::from_env()?)
    }

    /// Point the client at a different endpoint root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> Result<Url, GenerationError> {
        // "./" keeps "model:method" from parsing as a URL scheme
        self.base_url
            .join(&format!("./{}:generateContent", self.config.model))
            .map_err(|e| GenerationError::InvalidResponse(format!("bad endpoint: {}", e)))
    }

    fn request_body<'a>(&self, prompt: &'a TripPrompt) -> GeminiRequest<'a> {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: &prompt.system_instruction,
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart {
                    text: &prompt.user_prompt,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
                response_json_schema: &prompt.schema,
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    /// Pull the generated text out of a `generateContent` response body
    fn extract_text(body: &str) -> Result<String, GenerationError> {
        let response: GeminiResponse = serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            GenerationError::Json(e)
        })?;

        if let Some(usage) = &response.usage_metadata {
            info!(
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "Gemini API usage"
            );
        }

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| GenerationError::InvalidResponse("No candidates in response".into()))?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::InvalidResponse(format!(
                "Candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    // Url::join drops the last path segment unless the base ends with '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|source| ConfigError::BaseUrl {
        url: raw.to_string(),
        source,
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &TripPrompt) -> Result<String, GenerationError> {
        let url = self.endpoint()?;
        debug!(url = %url, model = %self.config.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Self::extract_text(&body)
    }
}
