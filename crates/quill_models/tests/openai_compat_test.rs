//! Live test against a real chat completions endpoint.
//!
//! Run with: `cargo test -p quill_models --features api -- --ignored`

#![cfg(feature = "api")]

use quill_core::GenerateRequest;
use quill_interface::ContentGenerator;
use quill_models::{GeneratorSettings, OpenAiCompatClient};

#[tokio::test]
#[ignore = "requires a reachable generator"]
async fn generates_text_from_live_endpoint() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let mut builder = GeneratorSettings::builder();
    if let Ok(url) = std::env::var("QUILL_GENERATOR_BASE_URL") {
        builder.base_url(url);
    }
    if let Ok(model) = std::env::var("QUILL_GENERATOR_MODEL") {
        builder.model(model);
    }
    let settings = builder
        .build()?
        .with_api_key(std::env::var("QUILL_GENERATOR_API_KEY").ok());

    let client = OpenAiCompatClient::new(&settings)?;
    let response = client
        .generate(&GenerateRequest::prompt("Reply with the single word: lantern"))
        .await?;

    assert!(!response.joined_text().trim().is_empty());
    Ok(())
}
