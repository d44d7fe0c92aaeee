//! Content generator trait.

use async_trait::async_trait;
use quill_core::{GenerateRequest, GenerateResponse};
use quill_error::QuillResult;

/// Core trait every generation backend implements.
///
/// Implementations impose their own timeout and retry policy; callers in the
/// pipeline never retry.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate output for a request.
    async fn generate(&self, req: &GenerateRequest) -> QuillResult<GenerateResponse>;

    /// Provider name (e.g., "openai", "ollama").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}
