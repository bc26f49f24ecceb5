//! Generation service configuration
//!
//! Read once at startup from the process environment. A missing API key is a
//! startup error, never a per-call failure.

use crate::error::ConfigError;

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the generative service client
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: u64,
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from environment variables
    ///
    /// - `GEMINI_API_KEY` (falls back to `API_KEY`), required
    /// - `GEMINI_MODEL`, default [`DEFAULT_MODEL`]
    /// - `GEMINI_TEMPERATURE`, optional float
    /// - `GEMINI_MAX_OUTPUT_TOKENS`, optional integer
    /// - `GEMINI_TIMEOUT_SECS`, default [`DEFAULT_TIMEOUT_SECS`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("GEMINI_API_KEY")
            .or_else(|| var("API_KEY"))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Some(model) = var("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = var("GEMINI_TEMPERATURE") {
            config.temperature = Some(parse_var("GEMINI_TEMPERATURE", &raw)?);
        }
        if let Some(raw) = var("GEMINI_MAX_OUTPUT_TOKENS") {
            config.max_output_tokens = Some(parse_var("GEMINI_MAX_OUTPUT_TOKENS", &raw)?);
        }
        if let Some(raw) = var("GEMINI_TIMEOUT_SECS") {
            config.timeout_seconds = parse_var("GEMINI_TIMEOUT_SECS", &raw)?;
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var: name,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = GenerationConfig::from_vars(vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let err = GenerationConfig::from_vars(vars(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::from_vars(vars(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.temperature, None);
    }

    #[test]
    fn test_api_key_fallback() {
        let config = GenerationConfig::from_vars(vars(&[("API_KEY", "legacy")])).unwrap();
        assert_eq!(config.api_key, "legacy");
    }

    #[test]
    fn test_overrides() {
        let config = GenerationConfig::from_vars(vars(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_TEMPERATURE", "0.4"),
            ("GEMINI_MAX_OUTPUT_TOKENS", "8192"),
            ("GEMINI_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.max_output_tokens, Some(8192));
        assert_eq!(config.timeout_seconds, 15);
    }

    #[test]
    fn test_invalid_number() {
        let err = GenerationConfig::from_vars(vars(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "GEMINI_TIMEOUT_SECS", .. }
        ));
    }
}
