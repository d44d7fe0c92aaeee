//! OpenAI-compatible chat completions backend.

mod client;
mod conversion;
mod dto;
mod settings;

pub use client::OpenAiCompatClient;
pub use dto::{
    ChatChoice, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ChatUsage,
    ResponseFormat,
};
pub use settings::{GeneratorSettings, GeneratorSettingsBuilder};
