//! Build the backend request from a caller's chat request.

use super::openai_types::{BackendChatRequest, ChatRequest};
use crate::config::RequestDefaults;
use crate::models::ModelMap;
use serde_json::Value;

/// Swap the caller's model for the backend id and fill omitted parameters.
/// Pure function: every other value passes through exactly as sent,
/// including explicit nulls and wrongly typed values. Defaults apply only to
/// keys the caller left out.
pub fn to_backend(
    req: &ChatRequest,
    models: &ModelMap,
    defaults: &RequestDefaults,
) -> BackendChatRequest {
    let or_default = |key: &str, default: Value| req.get(key).cloned().unwrap_or(default);

    BackendChatRequest {
        model: models.resolve(req.model_name()).to_string(),
        messages: req.get("messages").cloned(),
        temperature: or_default("temperature", Value::from(defaults.temperature)),
        max_tokens: or_default("max_tokens", Value::from(defaults.max_tokens)),
        stream: or_default("stream", Value::from(defaults.stream)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> ChatRequest {
        ChatRequest::from_value(body).unwrap()
    }

    fn translate(body: Value) -> BackendChatRequest {
        to_backend(&request(body), &ModelMap::default(), &RequestDefaults::default())
    }

    #[test]
    fn test_alias_is_remapped() {
        let out = translate(json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "hi"}],
            "stream": false,
        }));
        assert_eq!(out.model, "meta/llama-3.1-70b-instruct");
        assert_eq!(out.messages, Some(json!([{"role": "user", "content": "hi"}])));
        assert!(!out.is_streaming());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let out = translate(json!({"model": "gpt-4o", "messages": []}));
        assert_eq!(out.temperature, json!(0.7));
        assert_eq!(out.max_tokens, json!(1024));
        assert_eq!(out.stream, json!(false));
    }

    #[test]
    fn test_explicit_fields_win() {
        let out = translate(json!({
            "model": "unknown-model",
            "messages": [],
            "temperature": 0.0,
            "max_tokens": 16,
            "stream": true,
        }));
        assert_eq!(out.model, "deepseek-ai/deepseek-v3.1-terminus");
        assert_eq!(out.temperature, json!(0.0));
        assert_eq!(out.max_tokens, json!(16));
        assert!(out.is_streaming());
    }

    #[test]
    fn test_malformed_values_pass_through() {
        let out = translate(json!({
            "model": 123,
            "messages": "not a list",
            "temperature": "0.5",
            "max_tokens": 512.5,
            "stream": null,
        }));
        assert_eq!(out.model, "deepseek-ai/deepseek-v3.1-terminus");
        assert_eq!(out.messages, Some(json!("not a list")));
        assert_eq!(out.temperature, json!("0.5"));
        assert_eq!(out.max_tokens, json!(512.5));
        assert_eq!(out.stream, Value::Null);
        assert!(!out.is_streaming());
    }

    #[test]
    fn test_truthy_stream_value_streams() {
        let out = translate(json!({"model": "gpt-4", "stream": "yes"}));
        assert!(out.is_streaming());
        assert_eq!(out.stream, json!("yes"));
    }

    #[test]
    fn test_serialized_body_shape() {
        let out = translate(json!({"model": "gpt-3.5-turbo", "messages": [{"role": "user", "content": "x"}]}));
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({
                "model": "meta/llama-3.1-8b-instruct",
                "messages": [{"role": "user", "content": "x"}],
                "temperature": 0.7,
                "max_tokens": 1024,
                "stream": false,
            })
        );
    }

    #[test]
    fn test_explicit_null_is_forwarded() {
        let out = translate(json!({"model": "gpt-4", "temperature": null}));
        let body = serde_json::to_value(&out).unwrap();
        assert_eq!(body["temperature"], Value::Null);
        assert!(body.get("messages").is_none());
    }
}
