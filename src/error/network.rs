//! Network and server failures
//!
//! The server reports failures with a JSON payload that is either flat or
//! nested under an `"error"` key depending on the endpoint. Both shapes are
//! accepted by [`ServerErrorPayload::parse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{ErrorDetails, ForeignError, InfoMap};

/// Structured error body returned by the payments API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorPayload {
    pub error_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagnostics_id: Option<String>,
    #[serde(default)]
    pub validation_errors: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadShape {
    Nested { error: ServerErrorPayload },
    Flat(ServerErrorPayload),
}

impl ServerErrorPayload {
    /// Parse a response body in either the flat or the nested shape
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let shape: PayloadShape = serde_json::from_slice(body)?;
        Ok(match shape {
            PayloadShape::Nested { error } => error,
            PayloadShape::Flat(payload) => payload,
        })
    }

    /// Server-issued diagnostics id, when present and non-empty
    pub fn diagnostics_id(&self) -> Option<&str> {
        self.diagnostics_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

/// Failures of the network layer
#[derive(Debug, PartialEq, Error)]
pub enum NetworkError {
    #[error("Unauthorized request to {url} ({method})")]
    Unauthorized { url: String, method: String },

    #[error("Server error {status}")]
    ServerError {
        status: u16,
        response: Option<ServerErrorPayload>,
    },

    #[error("Failed to decode response: {message}")]
    FailedToDecode { message: String },

    #[error("Failed to encode request: {message}")]
    FailedToEncode { message: String },

    #[error("No data received")]
    NoData,

    #[error("Connection failed ({} underlying errors)", .errors.len())]
    Connectivity { errors: Vec<ForeignError> },
}

impl NetworkError {
    /// Whether a caller-side retry may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connectivity { .. } => true,
            Self::ServerError { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::Unauthorized { .. }
            | Self::FailedToDecode { .. }
            | Self::FailedToEncode { .. }
            | Self::NoData => false,
        }
    }
}

impl ErrorDetails for NetworkError {
    fn error_id(&self) -> String {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::ServerError { .. } => "server-error",
            Self::FailedToDecode { .. } => "failed-to-decode",
            Self::FailedToEncode { .. } => "failed-to-encode",
            Self::NoData => "no-data",
            Self::Connectivity { .. } => "connectivity-errors",
        }
        .to_string()
    }

    fn variant_info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        match self {
            Self::Unauthorized { url, method } => {
                info.insert("url".into(), Value::from(url.as_str()));
                info.insert("method".into(), Value::from(method.as_str()));
            }
            Self::ServerError { status, response } => {
                info.insert("statusCode".into(), Value::from(*status));
                if let Some(response) = response {
                    info.insert("serverErrorId".into(), Value::from(response.error_id.as_str()));
                    if let Some(description) = &response.description {
                        info.insert("serverDescription".into(), Value::from(description.as_str()));
                    }
                    if let Some(validation_errors) = &response.validation_errors {
                        info.insert(
                            "validationErrors".into(),
                            Value::from(validation_errors.clone()),
                        );
                    }
                }
            }
            Self::FailedToDecode { message } | Self::FailedToEncode { message } => {
                info.insert("message".into(), Value::from(message.as_str()));
            }
            Self::Connectivity { errors } => {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                info.insert("underlyingErrors".into(), Value::from(messages));
            }
            Self::NoData => {}
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_payload() {
        let body = br#"{"errorId":"server-down","description":"Down","diagnosticsId":"d-1","validationErrors":null}"#;
        let payload = ServerErrorPayload::parse(body).unwrap();

        assert_eq!(payload.error_id, "server-down");
        assert_eq!(payload.description.as_deref(), Some("Down"));
        assert_eq!(payload.diagnostics_id(), Some("d-1"));
        assert_eq!(payload.validation_errors, None);
    }

    #[test]
    fn test_parse_nested_payload() {
        let body = br#"{"error":{"errorId":"invalid-amount","description":"Bad","diagnosticsId":"d-2","validationErrors":["amount"]}}"#;
        let payload = ServerErrorPayload::parse(body).unwrap();

        assert_eq!(payload.error_id, "invalid-amount");
        assert_eq!(payload.diagnostics_id(), Some("d-2"));
        assert_eq!(payload.validation_errors, Some(vec!["amount".to_string()]));
    }

    #[test]
    fn test_parse_rejects_unrelated_body() {
        assert!(ServerErrorPayload::parse(b"<html>Bad gateway</html>").is_err());
        assert!(ServerErrorPayload::parse(br#"{"message":"nope"}"#).is_err());
    }

    #[test]
    fn test_retryability_follows_status() {
        let server = |status| NetworkError::ServerError {
            status,
            response: None,
        };

        assert!(server(503).is_retryable());
        assert!(server(429).is_retryable());
        assert!(!server(400).is_retryable());
        assert!(NetworkError::Connectivity { errors: vec![] }.is_retryable());
        assert!(!NetworkError::NoData.is_retryable());
    }
}
