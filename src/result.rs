//! The peer's result envelope and the ledger error that wraps a failed one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Uniform success/error envelope returned by query and submit.
///
/// `error_code` is present exactly when the ledger reported a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvexResult {
    /// The returned value as JSON, when representable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// The printed form of the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Ledger error code such as `FUNDS` or `SEQUENCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Execution metadata: juice, fees, trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

impl ConvexResult {
    /// Whether the ledger reported an error.
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// A failed [`ConvexResult`] raised as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexError {
    result: ConvexResult,
}

impl ConvexError {
    pub fn new(result: ConvexResult) -> Self {
        Self { result }
    }

    /// The ledger error code.
    pub fn code(&self) -> &str {
        self.result.error_code.as_deref().unwrap_or("UNKNOWN")
    }

    /// Execution metadata reported alongside the failure.
    pub fn info(&self) -> Option<&Value> {
        self.result.info.as_ref()
    }

    /// The full result the ledger returned.
    pub fn result(&self) -> &ConvexResult {
        &self.result
    }

    pub fn into_result(self) -> ConvexResult {
        self.result
    }

    fn describe(&self) -> String {
        match (&self.result.value, &self.result.result) {
            (Some(Value::String(s)), _) => s.clone(),
            (Some(v), _) => v.to_string(),
            (None, Some(printed)) => printed.clone(),
            (None, None) => "no message".to_string(),
        }
    }
}

impl fmt::Display for ConvexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Convex error {}: {}", self.code(), self.describe())
    }
}

impl std::error::Error for ConvexError {}

/// Raise a [`ConvexError`] if `result` carries an error code, else hand it back unchanged.
pub fn throw_if_error(result: ConvexResult) -> Result<ConvexResult, ConvexError> {
    if result.is_error() {
        Err(ConvexError::new(result))
    } else {
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_passes_through() {
        let result = ConvexResult {
            value: Some(json!(42)),
            result: Some("42".to_string()),
            ..Default::default()
        };

        let returned = throw_if_error(result.clone()).unwrap();
        assert_eq!(returned, result);
    }

    #[test]
    fn test_error_code_raises() {
        let result = ConvexResult {
            value: Some(json!("Insufficient funds")),
            error_code: Some("FUNDS".to_string()),
            info: Some(json!({"juice": 1200})),
            ..Default::default()
        };

        let err = throw_if_error(result.clone()).unwrap_err();
        assert_eq!(err.code(), "FUNDS");
        assert_eq!(err.info(), Some(&json!({"juice": 1200})));
        assert_eq!(err.result(), &result);
        assert_eq!(err.to_string(), "Convex error FUNDS: Insufficient funds");
    }

    #[test]
    fn test_deserialize_peer_json() {
        let parsed: ConvexResult = serde_json::from_value(json!({
            "value": null,
            "errorCode": "SEQUENCE",
            "info": {"fees": 10}
        }))
        .unwrap();

        assert!(parsed.is_error());
        assert_eq!(parsed.error_code.as_deref(), Some("SEQUENCE"));
        assert_eq!(parsed.value, None);
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let result = ConvexResult {
            result: Some("#12".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, json!({"result": "#12"}));
    }
}
