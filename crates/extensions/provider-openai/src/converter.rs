//! Conversion between protocol types and the OpenAI wire format.

use unravel_protocols::provider::{CompletionRequest, CompletionResponse};
use unravel_protocols::types::{Message, MessageRole, StopReason, Usage};

use crate::api::{ApiMessage, ApiRequest, ApiResponse};

/// Build the wire request for a non-streaming completion.
pub fn build_request(request: &CompletionRequest) -> ApiRequest {
    ApiRequest {
        model: request.model.clone(),
        messages: request.messages.iter().map(convert_message).collect(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stream: false,
    }
}

fn convert_message(msg: &Message) -> ApiMessage {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };
    ApiMessage {
        role: role.to_string(),
        content: msg.content.clone(),
    }
}

/// Turn the first choice of an API response into a protocol response.
pub fn parse_response(response: ApiResponse) -> CompletionResponse {
    let choice = response.choices.into_iter().next();
    let (content, finish_reason) = match choice {
        Some(choice) => (
            choice.message.content.unwrap_or_default(),
            choice.finish_reason,
        ),
        None => (String::new(), None),
    };

    let usage = response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    CompletionResponse {
        id: response.id,
        model: response.model,
        message: Message::assistant(content),
        stop_reason: convert_finish_reason(finish_reason.as_deref()),
        usage,
    }
}

fn convert_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("length") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiUsage, Choice, ResponseMessage};

    fn response_with(content: Option<&str>, finish_reason: Option<&str>) -> ApiResponse {
        ApiResponse {
            id: "chatcmpl-1".to_string(),
            model: "gpt-4o-mini".to_string(),
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    role: "assistant".to_string(),
                    content: content.map(str::to_string),
                },
                finish_reason: finish_reason.map(str::to_string),
            }],
            usage: Some(ApiUsage {
                prompt_tokens: 12,
                completion_tokens: 8,
                total_tokens: 20,
            }),
        }
    }

    #[test]
    fn test_convert_roles() {
        assert_eq!(convert_message(&Message::system("s")).role, "system");
        assert_eq!(convert_message(&Message::user("u")).role, "user");
        assert_eq!(convert_message(&Message::assistant("a")).role, "assistant");
    }

    #[test]
    fn test_build_request_copies_sampling() {
        let request = CompletionRequest::new(
            "gpt-4o-mini",
            vec![Message::system("You simplify JavaScript"), Message::user("var a=1;")],
        )
        .with_temperature(0.1)
        .with_max_tokens(4000);
        let api_request = build_request(&request);
        assert_eq!(api_request.messages.len(), 2);
        assert_eq!(api_request.temperature, Some(0.1));
        assert_eq!(api_request.max_tokens, Some(4000));
        assert!(!api_request.stream);
    }

    #[test]
    fn test_parse_response_text() {
        let response = parse_response(response_with(Some("var a = 1;"), Some("stop")));
        assert_eq!(response.message.content, "var a = 1;");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.total_tokens, 20);
    }

    #[test]
    fn test_parse_response_truncated() {
        let response = parse_response(response_with(Some("var a"), Some("length")));
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
    }

    #[test]
    fn test_parse_response_null_content() {
        let response = parse_response(response_with(None, Some("stop")));
        assert!(response.message.content.is_empty());
    }

    #[test]
    fn test_parse_response_no_choices() {
        let response = parse_response(ApiResponse {
            id: String::new(),
            model: String::new(),
            choices: vec![],
            usage: None,
        });
        assert!(response.message.content.is_empty());
        assert_eq!(response.usage.total_tokens, 0);
    }
}
