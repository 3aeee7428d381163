//! Canonicalization of raw failures
//!
//! Every failure passes through [`normalize`] once, at the point where it
//! leaves its owning subsystem. The result is the only value handed to the
//! handler chain and the host application.

use std::error::Error as StdError;

use tracing::{debug, warn};

use crate::error::network::{NetworkError, ServerErrorPayload};
use crate::error::{ErrorKind, ForeignError, PaymentError, Underlying};

/// Any failure that may reach the normalizer
#[derive(Debug)]
pub enum RawError {
    /// Produced by this SDK, possibly still wrapped
    Sdk(PaymentError),
    /// Produced outside the SDK and never classified
    Foreign(ForeignError),
}

impl RawError {
    pub fn foreign<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Foreign(ForeignError::new(error))
    }
}

impl From<PaymentError> for RawError {
    fn from(error: PaymentError) -> Self {
        Self::Sdk(error)
    }
}

impl From<ForeignError> for RawError {
    fn from(error: ForeignError) -> Self {
        Self::Foreign(error)
    }
}

impl From<Underlying> for RawError {
    fn from(member: Underlying) -> Self {
        match member {
            Underlying::Sdk(error) => Self::Sdk(error),
            Underlying::Foreign(error) => Self::Foreign(error),
        }
    }
}

/// Turn a raw failure into the canonical error. Never fails.
pub fn normalize(raw: impl Into<RawError>) -> PaymentError {
    match raw.into() {
        RawError::Sdk(error) => normalize_sdk(error),
        // An unclassified failure becomes a minimal aggregate wrapper that
        // keeps the foreign value as context
        RawError::Foreign(foreign) => {
            debug!(type_name = foreign.type_name(), "Wrapping foreign error");
            PaymentError::aggregate(vec![Underlying::Foreign(foreign)])
        }
    }
}

fn normalize_sdk(error: PaymentError) -> PaymentError {
    let (kind, diagnostics, extra_info) = error.into_parts();
    match kind {
        ErrorKind::Internal(wrapper) => normalize_sdk(wrapper.into_inner()),
        ErrorKind::Aggregate(mut members) if members.len() <= 1 => match members.pop() {
            None => {
                warn!(
                    diagnostics_id = diagnostics.id(),
                    "Empty aggregate error reached the normalizer"
                );
                PaymentError::unknown()
            }
            Some(Underlying::Sdk(inner)) => normalize_sdk(inner),
            // Already the minimal wrapper; keep identity so repeated
            // normalization is a no-op
            Some(foreign @ Underlying::Foreign(_)) => PaymentError::from_parts(
                ErrorKind::Aggregate(vec![foreign]),
                diagnostics,
                extra_info,
            ),
        },
        // Bridge and validation errors are canonical by construction, and
        // larger aggregates are surfaced as a whole
        kind => PaymentError::from_parts(kind, diagnostics, extra_info),
    }
}

/// Classify an HTTP response; successful statuses yield `None`
pub fn classify_http_response(
    url: &str,
    method: &str,
    status: u16,
    body: &[u8],
) -> Option<PaymentError> {
    match status {
        200..=299 => None,
        401 => Some(PaymentError::unauthorized(url, method)),
        _ => {
            let payload = match ServerErrorPayload::parse(body) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    debug!(status, error = %e, "Server error body is not a structured payload");
                    None
                }
            };
            Some(PaymentError::server_error(status, payload))
        }
    }
}

/// Response body could not be decoded into the expected shape
pub fn decode_failure(error: &serde_json::Error) -> PaymentError {
    NetworkError::FailedToDecode {
        message: error.to_string(),
    }
    .into()
}

/// One or more transport failures prevented a response
pub fn connectivity_failure(errors: Vec<ForeignError>) -> PaymentError {
    PaymentError::connectivity(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorDetails;
    use crate::error::validation::ValidationError;

    #[test]
    fn test_http_success_is_not_an_error() {
        assert!(classify_http_response("https://api/payments", "POST", 201, b"").is_none());
    }

    #[test]
    fn test_http_unauthorized() {
        let error = classify_http_response("https://api/payments", "POST", 401, b"").unwrap();
        assert_eq!(error.error_id(), "unauthorized");
        assert_eq!(error.kind().variant_info().get("method"), Some(&"POST".into()));
    }

    #[test]
    fn test_http_unstructured_body_still_classifies() {
        let error =
            classify_http_response("https://api/payments", "GET", 502, b"<html>Bad gateway</html>")
                .unwrap();

        assert_eq!(error.error_id(), "server-error");
        assert!(matches!(
            error.kind(),
            ErrorKind::Network(NetworkError::ServerError {
                status: 502,
                response: None
            })
        ));
    }

    #[test]
    fn test_validation_passes_through_with_same_diagnostics() {
        let error: PaymentError = ValidationError::invalid_card_number("Card number is invalid").into();
        let id = error.diagnostics_id().to_string();
        let normalized = normalize(error);

        assert_eq!(normalized.error_id(), "invalid-card-number");
        assert_eq!(normalized.diagnostics_id(), id);
    }

    #[test]
    fn test_decode_failure() {
        let e = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = decode_failure(&e);
        assert_eq!(error.error_id(), "failed-to-decode");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_connectivity_failure_is_retryable() {
        let error = connectivity_failure(vec![
            ForeignError::from_boxed("dns lookup failed".into()),
            ForeignError::from_boxed("connection refused".into()),
        ]);

        assert_eq!(error.error_id(), "connectivity-errors");
        assert!(error.is_retryable());
        match normalize(error).kind() {
            ErrorKind::Network(NetworkError::Connectivity { errors }) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[1].to_string(), "connection refused");
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
