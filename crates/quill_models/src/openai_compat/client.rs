//! OpenAI-compatible chat completions client.

use super::{ChatRequest, ChatResponse, GeneratorSettings, conversion};
use async_trait::async_trait;
use quill_core::{GenerateRequest, GenerateResponse};
use quill_error::{GeneratorError, GeneratorErrorKind, QuillResult, RetryableError};
use quill_interface::ContentGenerator;
use reqwest::Client;
use std::time::Duration;
use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};
use tracing::{debug, instrument, warn};

/// Client for any `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    settings: GeneratorSettings,
}

impl OpenAiCompatClient {
    /// Creates a client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip_all, fields(base_url = %settings.base_url(), model = %settings.model()))]
    pub fn new(settings: &GeneratorSettings) -> QuillResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(*settings.timeout_secs()))
            .build()
            .map_err(|e| {
                GeneratorError::new(GeneratorErrorKind::Configuration(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;
        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    /// Settings this client was built with.
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    async fn send_once(&self, body: &ChatRequest) -> Result<ChatResponse, GeneratorError> {
        let mut request = self.client.post(self.settings.endpoint()).json(body);
        if let Some(key) = self.settings.api_key() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            GeneratorError::new(GeneratorErrorKind::Transport(format!(
                "Request failed: {}",
                e
            )))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeneratorError::new(GeneratorErrorKind::Status {
                status: status.as_u16(),
                message,
            }));
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            GeneratorError::new(GeneratorErrorKind::Decode(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }

    async fn send_with_retry(&self, body: &ChatRequest) -> Result<ChatResponse, GeneratorError> {
        let first = self.send_once(body).await;
        let err = match first {
            Ok(response) => return Ok(response),
            Err(e) if !e.is_retryable() || *self.settings.max_retries() == 0 => return Err(e),
            Err(e) => e,
        };

        let (initial_ms, _, max_delay_secs) = err.retry_strategy_params();
        let max_retries = *self.settings.max_retries();
        warn!(
            error = %err,
            initial_backoff_ms = initial_ms,
            max_retries,
            "Generator request failed, will retry"
        );

        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        Retry::spawn(strategy, move || async move {
            match self.send_once(body).await {
                Ok(response) => Ok(response),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Generator request failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent generator error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

#[async_trait]
impl ContentGenerator for OpenAiCompatClient {
    #[instrument(skip(self, req), fields(model = %self.settings.model(), schema = ?req.schema))]
    async fn generate(&self, req: &GenerateRequest) -> QuillResult<GenerateResponse> {
        let body = conversion::to_chat_request(req, &self.settings)?;
        debug!(messages = body.messages().len(), "Sending chat completion request");

        let response = self.send_with_retry(&body).await?;
        if let Some(usage) = response.usage() {
            debug!(
                prompt_tokens = usage.prompt_tokens(),
                completion_tokens = usage.completion_tokens(),
                "Chat completion finished"
            );
        }
        Ok(conversion::from_chat_response(&response))
    }

    fn provider_name(&self) -> &'static str {
        "openai_compat"
    }

    fn model_name(&self) -> &str {
        self.settings.model()
    }
}
