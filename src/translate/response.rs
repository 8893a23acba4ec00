use super::openai_types::{ChatCompletion, CHAT_COMPLETION_OBJECT};
use super::present;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Reshape a buffered backend completion into the caller-facing envelope.
/// Pure function: `now` stands in for the clock, `requested_model` is what
/// the caller originally sent and is echoed back instead of the backend id.
///
/// Backend values are kept whatever their type; fields that are absent,
/// null, zero or empty take their defaults.
pub fn normalize_completion(
    data: &Value,
    requested_model: Option<&Value>,
    now: DateTime<Utc>,
) -> ChatCompletion {
    let id = present(data.get("id"))
        .unwrap_or_else(|| Value::from(format!("chatcmpl-{}", now.timestamp_millis())));

    let created = present(data.get("created")).unwrap_or_else(|| Value::from(now.timestamp()));

    let choices = present(data.get("choices")).unwrap_or_else(|| Value::Array(Vec::new()));

    let usage = present(data.get("usage")).unwrap_or_else(zero_usage);

    ChatCompletion {
        id,
        object: CHAT_COMPLETION_OBJECT.to_string(),
        created,
        model: requested_model.cloned(),
        choices,
        usage,
    }
}

fn zero_usage() -> Value {
    json!({"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0})
}
