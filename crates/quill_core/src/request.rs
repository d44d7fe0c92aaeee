//! Request and response types for content generation.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Generation request.
///
/// When `schema` is set the generator is asked for a JSON object containing
/// at least the listed fields.
///
/// # Examples
///
/// ```
/// use quill_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Outline a heist.")])
///     .max_tokens(Some(400))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 1);
/// assert!(request.schema.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_builder::Builder)]
#[builder(default)]
pub struct GenerateRequest {
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Model override
    pub model: Option<String>,
    /// Name of the structured response expected, if any
    pub schema: Option<String>,
    /// Fields the structured response must carry
    pub required_fields: Vec<String>,
}

impl GenerateRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// A single-prompt request with no schema.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            ..Default::default()
        }
    }
}

/// One unit of generator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text
    Text(String),
    /// Already-parsed JSON
    Json(serde_json::Value),
}

/// The unified response object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Outputs in the order produced
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// A response carrying a single text output.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            outputs: vec![Output::Text(text.into())],
        }
    }

    /// All outputs flattened into a single string.
    pub fn joined_text(&self) -> String {
        self.outputs
            .iter()
            .map(|o| match o {
                Output::Text(t) => t.clone(),
                Output::Json(v) => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
