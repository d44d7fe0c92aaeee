//! Result-returning wrapper around a [`ContentGenerator`].
//!
//! Nodes never see a [`QuillError`](quill_error::QuillError) from the
//! generator. Every call comes back as `Result<T, GenerationFailure>` and the
//! node chooses its fallback by matching on the failure.

use crate::extract_json;
use quill_core::{GenerateRequest, GenerateResponse, Message, Output};
use quill_error::GenerationFailure;
use quill_interface::ContentGenerator;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a novelist collaborating on a long-form story. \
Follow the instructions exactly and keep continuity with everything you are told.";

/// Shape a structured response must have.
///
/// Only top-level required keys are checked before deserialisation; serde
/// rejects anything else that does not fit the target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSchema {
    /// Name reported in failures and sent to the generator
    pub name: &'static str,
    /// Keys the top-level JSON object must contain
    pub required: &'static [&'static str],
}

impl ResponseSchema {
    /// Create a schema description.
    pub const fn new(name: &'static str, required: &'static [&'static str]) -> Self {
        Self { name, required }
    }

    fn instruction(&self) -> String {
        format!(
            "\n\nRespond with a single JSON object only, with no commentary. \
             It must contain the keys: {}.",
            self.required.join(", ")
        )
    }

    /// Check the required keys and decode.
    fn accept<T: DeserializeOwned>(&self, value: Value) -> Result<T, GenerationFailure> {
        let reject = |reason: String| GenerationFailure::SchemaRejected {
            schema: self.name.to_string(),
            reason,
        };
        let Some(object) = value.as_object() else {
            return Err(reject("expected a JSON object".to_string()));
        };
        if let Some(missing) = self.required.iter().find(|k| !object.contains_key(**k)) {
            return Err(reject(format!("missing field '{}'", missing)));
        }
        serde_json::from_value(value).map_err(|e| reject(e.to_string()))
    }
}

/// Generator handle shared by every node.
#[derive(Clone)]
pub struct GeneratorAdapter {
    generator: Arc<dyn ContentGenerator>,
    max_tokens: Option<u32>,
}

impl std::fmt::Debug for GeneratorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorAdapter")
            .field("provider", &self.generator.provider_name())
            .field("model", &self.generator.model_name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeneratorAdapter {
    /// Wrap a generator.
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            max_tokens: None,
        }
    }

    /// Cap the length of every response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Provider and model, for logging.
    pub fn describe(&self) -> String {
        format!(
            "{}/{}",
            self.generator.provider_name(),
            self.generator.model_name()
        )
    }

    fn request(&self, prompt: String, schema: Option<&ResponseSchema>) -> GenerateRequest {
        GenerateRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
            max_tokens: self.max_tokens,
            schema: schema.map(|s| s.name.to_string()),
            required_fields: schema
                .map(|s| s.required.iter().map(|f| f.to_string()).collect())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    async fn call(&self, request: GenerateRequest) -> Result<GenerateResponse, GenerationFailure> {
        self.generator
            .generate(&request)
            .await
            .map_err(|e| GenerationFailure::Transport(e.to_string()))
    }

    /// Free text completion. Whitespace-only output is [`GenerationFailure::Empty`].
    #[tracing::instrument(skip_all, fields(prompt_len = prompt.len()))]
    pub async fn text(&self, prompt: &str) -> Result<String, GenerationFailure> {
        let response = self.call(self.request(prompt.to_string(), None)).await?;
        let text = response.joined_text();
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationFailure::Empty);
        }
        Ok(text.to_string())
    }

    /// Structured completion decoded into `T`.
    ///
    /// A native JSON output is used as-is; otherwise the JSON payload is
    /// extracted from the text.
    #[tracing::instrument(skip_all, fields(schema = schema.name))]
    pub async fn structured<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<T, GenerationFailure> {
        let prompt = format!("{}{}", prompt, schema.instruction());
        let response = self.call(self.request(prompt, Some(schema))).await?;

        let native = response.outputs.iter().find_map(|o| match o {
            Output::Json(value) => Some(value.clone()),
            Output::Text(_) => None,
        });
        let value = match native {
            Some(value) => value,
            None => {
                let text = response.joined_text();
                if text.trim().is_empty() {
                    return Err(GenerationFailure::Empty);
                }
                let payload = extract_json(&text)?;
                serde_json::from_str(payload)
                    .map_err(|e| GenerationFailure::Malformed(e.to_string()))?
            }
        };
        schema.accept(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_error::{GeneratorError, GeneratorErrorKind, QuillResult};
    use serde::Deserialize;

    /// Replies with fixed text, or fails when `None`.
    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl ContentGenerator for Fixed {
        async fn generate(&self, _req: &GenerateRequest) -> QuillResult<GenerateResponse> {
            match self.0 {
                Some(text) => Ok(GenerateResponse::text(text)),
                None => Err(GeneratorError::new(GeneratorErrorKind::Transport(
                    "connection reset".into(),
                ))
                .into()),
            }
        }
        fn provider_name(&self) -> &'static str {
            "fixed"
        }
        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Title {
        title: String,
    }

    const TITLE: ResponseSchema = ResponseSchema::new("title", &["title"]);

    fn adapter(reply: Option<&'static str>) -> GeneratorAdapter {
        GeneratorAdapter::new(Arc::new(Fixed(reply)))
    }

    #[tokio::test]
    async fn structured_reads_fenced_json() {
        let a = adapter(Some("```json\n{\"title\": \"Ashfall\"}\n```"));
        let title: Title = a.structured("name it", &TITLE).await.unwrap();
        assert_eq!(title.title, "Ashfall");
    }

    #[tokio::test]
    async fn missing_required_field_is_schema_rejection() {
        let a = adapter(Some("{\"name\": \"Ashfall\"}"));
        let result: Result<Title, _> = a.structured("name it", &TITLE).await;
        assert!(matches!(
            result,
            Err(GenerationFailure::SchemaRejected { schema, .. }) if schema == "title"
        ));
    }

    #[tokio::test]
    async fn blank_text_is_empty() {
        let a = adapter(Some("  \n"));
        assert_eq!(a.text("go").await, Err(GenerationFailure::Empty));
    }

    #[tokio::test]
    async fn generator_error_is_transport() {
        let a = adapter(None);
        assert!(matches!(
            a.text("go").await,
            Err(GenerationFailure::Transport(_))
        ));
    }

    #[test]
    fn token_cap_reaches_every_request() {
        let a = adapter(Some("ok")).with_max_tokens(64);
        assert_eq!(a.request("go".into(), None).max_tokens, Some(64));
        assert_eq!(a.request("go".into(), Some(&TITLE)).max_tokens, Some(64));
        assert_eq!(adapter(None).request("go".into(), None).max_tokens, None);
        assert_eq!(a.describe(), "fixed/fixed");
    }
}
