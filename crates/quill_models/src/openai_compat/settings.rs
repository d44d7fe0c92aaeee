//! Connection settings for the chat completions backend.

use serde::{Deserialize, Serialize};

/// Where and how to reach the generator.
///
/// # Examples
///
/// ```
/// use quill_models::GeneratorSettings;
///
/// let settings = GeneratorSettings::builder()
///     .model("gpt-4o-mini")
///     .base_url("https://api.openai.com/v1")
///     .build()
///     .unwrap();
/// assert_eq!(*settings.timeout_secs(), 120);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Base URL up to but excluding `/chat/completions`
    base_url: String,
    /// Model identifier
    model: String,
    /// Bearer token, if the backend needs one
    api_key: Option<String>,
    /// Per-request timeout
    timeout_secs: u64,
    /// Retries after the first attempt for transient failures
    max_retries: usize,
    /// Default sampling temperature
    temperature: Option<f32>,
    /// Default token ceiling
    max_tokens: Option<u32>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
            api_key: None,
            timeout_secs: 120,
            max_retries: 3,
            temperature: Some(0.8),
            max_tokens: None,
        }
    }
}

impl GeneratorSettings {
    /// Creates a new settings builder.
    pub fn builder() -> GeneratorSettingsBuilder {
        GeneratorSettingsBuilder::default()
    }

    /// Copy of these settings with the API key replaced.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Full chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
