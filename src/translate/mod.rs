//! Translation between the caller's chat-completions shape and the backend's.
//!
//! All functions here are pure (no I/O). The proxy module owns the network side.

pub mod openai_types;
pub mod request;
pub mod response;

use serde_json::Value;

/// JSON values treated as "not provided": null, false, zero and "".
/// Arrays and objects count as provided even when empty.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// The value at `value` if it is truthy, cloned.
pub(crate) fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| is_truthy(v)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!(-0.5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
        assert_eq!(present(None), None);
        assert_eq!(present(Some(&json!(42))), Some(json!(42)));
    }
}
