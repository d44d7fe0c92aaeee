//! Content generator backends for Quill.
//!
//! The pipeline talks to any service exposing an OpenAI-compatible
//! `/chat/completions` endpoint (OpenAI, Groq, Ollama, vLLM, llama.cpp
//! server, ...). Transient failures are retried here, at the boundary, so the
//! pipeline core never has to.
//!
//! # Example
//!
//! ```no_run
//! use quill_models::{GeneratorSettings, OpenAiCompatClient};
//! use quill_interface::ContentGenerator;
//! use quill_core::GenerateRequest;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = GeneratorSettings::default();
//! let client = OpenAiCompatClient::new(&settings)?;
//! let response = client.generate(&GenerateRequest::prompt("Name a lighthouse.")).await?;
//! println!("{}", response.joined_text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai_compat;

pub use openai_compat::{
    ChatChoice, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ChatUsage,
    GeneratorSettings, GeneratorSettingsBuilder, OpenAiCompatClient, ResponseFormat,
};
