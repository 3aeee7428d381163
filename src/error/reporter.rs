//! Serializable snapshot of a canonical error for support bundles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorClass, ErrorSeverity, InfoMap, PaymentError};

/// Everything support needs to investigate one failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Unique identifier for the report itself
    pub report_id: Uuid,
    pub error_id: String,
    pub diagnostics_id: String,
    pub description: String,
    pub recovery_suggestion: Option<String>,
    pub class: ErrorClass,
    pub severity: ErrorSeverity,
    pub retryable: bool,
    pub info: InfoMap,
    pub analytics_context: InfoMap,
    /// Time the report was generated, not the error's `createdAt`
    pub generated_at: DateTime<Utc>,
}

impl ErrorReport {
    /// Create a new error report from an error
    pub fn new(error: &PaymentError) -> Self {
        let class = error.class();
        Self {
            report_id: Uuid::new_v4(),
            error_id: error.error_id(),
            diagnostics_id: error.diagnostics_id().to_string(),
            description: error.description(),
            recovery_suggestion: error.recovery_suggestion(),
            class,
            severity: class.severity(),
            retryable: error.is_retryable(),
            info: error.info(),
            analytics_context: error.analytics_context(),
            generated_at: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&PaymentError> for ErrorReport {
    fn from(error: &PaymentError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::network::ServerErrorPayload;

    #[test]
    fn test_report_snapshot() {
        let payload = ServerErrorPayload::parse(
            br#"{"errorId":"server-down","description":"Down","diagnosticsId":"d-1"}"#,
        )
        .unwrap();
        let error = PaymentError::server_error(503, Some(payload));
        let report = ErrorReport::new(&error);

        assert_eq!(report.error_id, "server-error");
        assert_eq!(report.diagnostics_id, "d-1");
        assert_eq!(report.class, ErrorClass::Transient);
        assert!(report.retryable);
        assert!(report.info.contains_key("createdAt"));
        assert_eq!(report.info.get("statusCode"), Some(&503.into()));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ErrorReport::from(&PaymentError::unknown());
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["errorId"], "unknown");
        assert_eq!(json["severity"], "error");
        assert!(json["recoverySuggestion"].as_str().unwrap().contains("Contact support"));
        assert_eq!(json["analyticsContext"]["errorId"], "unknown");
    }
}
