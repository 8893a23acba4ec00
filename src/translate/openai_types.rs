//! Wire types for the [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat)
//! as spoken by callers, and the body the proxy sends to the backend.
//!
//! Caller fields are carried as opaque JSON: the proxy never type-checks
//! them, so malformed shapes reach the backend untouched and fail there.

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Inbound (what callers send us)
// ---------------------------------------------------------------------------

/// A caller's chat request, kept as the raw JSON object it arrived as.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    fields: Map<String, Value>,
}

impl ChatRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// A JSON `null` body is rejected. Other non-object bodies have no named
    /// fields, so every field takes its default.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Err(ProxyError::request("request body is null")),
            _ => Ok(Self::default()),
        }
    }

    /// Raw value of `key`; `Some(Value::Null)` when the caller sent an explicit null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn model(&self) -> Option<&Value> {
        self.get("model")
    }

    /// The requested model when it is a string; anything else resolves to the default.
    pub fn model_name(&self) -> Option<&str> {
        self.model().and_then(Value::as_str)
    }

    /// Requested model for log lines.
    pub fn model_label(&self) -> String {
        match self.model() {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => "<none>".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound (what we send TO the backend)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendChatRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Value>,
    pub temperature: Value,
    pub max_tokens: Value,
    pub stream: Value,
}

impl BackendChatRequest {
    /// Streaming follows the truthiness of whatever `stream` value was sent.
    pub fn is_streaming(&self) -> bool {
        super::is_truthy(&self.stream)
    }
}

// ---------------------------------------------------------------------------
// Responses (what we send back to callers)
// ---------------------------------------------------------------------------

pub const CHAT_COMPLETION_OBJECT: &str = "chat.completion";

/// Normalized buffered completion. `model` is the caller's requested value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: Value,
    pub object: String,
    pub created: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    pub choices: Value,
    pub usage: Value,
}

/// Error envelope returned for every failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            message: None,
        }
    }

    pub fn method_not_allowed() -> Self {
        Self::new("Method not allowed")
    }

    pub fn missing_api_key(backend_label: &str) -> Self {
        Self::new(format!("{backend_label} API key not configured"))
    }

    /// Backend answered with a non-success status; `details` is its raw body.
    pub fn backend_rejected(backend_label: &str, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(format!("{backend_label} API request failed"))
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new("Internal server error")
        }
    }
}
