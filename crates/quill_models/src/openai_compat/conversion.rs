//! Conversion between Quill request types and the chat completions format.

use super::{ChatMessage, ChatRequest, ChatResponse, GeneratorSettings, ResponseFormat};
use quill_core::{GenerateRequest, GenerateResponse, Output, Role};
use quill_error::{GeneratorError, GeneratorErrorKind};

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Build the wire request, falling back to settings for unset parameters.
pub fn to_chat_request(
    req: &GenerateRequest,
    settings: &GeneratorSettings,
) -> Result<ChatRequest, GeneratorError> {
    let messages = req
        .messages
        .iter()
        .map(|m| ChatMessage::new(role_name(m.role), m.content.clone()))
        .collect::<Vec<_>>();

    ChatRequest::builder()
        .model(req.model.clone().unwrap_or_else(|| settings.model().clone()))
        .messages(messages)
        .temperature(req.temperature.or(*settings.temperature()))
        .max_tokens(req.max_tokens.or(*settings.max_tokens()))
        .response_format(req.schema.as_ref().map(|_| ResponseFormat::json_object()))
        .build()
        .map_err(|e| GeneratorError::new(GeneratorErrorKind::Configuration(e.to_string())))
}

/// Flatten the first choice into a text output.
pub fn from_chat_response(response: &ChatResponse) -> GenerateResponse {
    let outputs = response
        .choices()
        .first()
        .map(|choice| vec![Output::Text(choice.message().content().clone())])
        .unwrap_or_default();
    GenerateResponse { outputs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Message;

    #[test]
    fn schema_requests_json_mode() {
        let req = GenerateRequest {
            messages: vec![Message::system("Be terse."), Message::user("Outline.")],
            schema: Some("outline".into()),
            ..Default::default()
        };
        let chat = to_chat_request(&req, &GeneratorSettings::default()).unwrap();

        assert_eq!(chat.messages()[0].role(), "system");
        assert_eq!(chat.model(), "llama3.1");
        assert_eq!(
            chat.response_format().as_ref().map(|f| f.format_type()),
            Some("json_object")
        );
    }

    #[test]
    fn request_overrides_settings() {
        let req = GenerateRequest {
            messages: vec![Message::user("Hi")],
            temperature: Some(0.1),
            model: Some("other".into()),
            ..Default::default()
        };
        let chat = to_chat_request(&req, &GeneratorSettings::default()).unwrap();
        assert_eq!(*chat.temperature(), Some(0.1));
        assert_eq!(chat.model(), "other");
        assert!(chat.response_format().is_none());
    }

    #[test]
    fn empty_choices_yield_no_outputs() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(from_chat_response(&response).outputs.is_empty());

        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Hello"}, "finish_reason": "stop"}]}"#,
        )
        .unwrap();
        assert_eq!(from_chat_response(&response).joined_text(), "Hello");
    }
}
