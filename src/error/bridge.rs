//! Failures raised by integrated third-party SDKs
//!
//! A bridge error wraps the foreign SDK's failure without reinterpreting it.
//! These errors are already canonical: their ids are authoritative and the
//! normalizer returns them untouched.

use serde_json::Value;
use thiserror::Error;

use crate::error::taxonomy::{insert_opt, payment_method};
use crate::error::{ErrorDetails, ForeignError, InfoMap};

/// Failure reported by a third-party SDK that exposes a code and a message
#[derive(Debug, PartialEq, Error)]
#[error("{message}")]
pub struct NativeFailure {
    pub code: Option<String>,
    pub message: String,
    pub native: Option<ForeignError>,
}

impl NativeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            native: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Keep the SDK's own error value as opaque context
    pub fn with_native(mut self, native: ForeignError) -> Self {
        self.native = Some(native);
        self
    }
}

/// Error details reported by the 3-D Secure SDK itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreeDsErrorInfo {
    pub error_id: String,
    pub description: String,
    pub recovery_suggestion: Option<String>,
    pub code: Option<i64>,
    pub error_type: Option<String>,
    pub component: Option<String>,
    pub transaction_id: Option<String>,
    pub protocol_version: Option<String>,
    pub detail: Option<String>,
}

/// What went wrong inside the 3-D Secure bridge
#[derive(Debug, PartialEq, Error)]
pub enum ThreeDsErrorKind {
    #[error("3DS SDK is not linked")]
    MissingSdkDependency,

    #[error("3DS SDK version is not supported (expected {valid_version})")]
    InvalidSdkVersion {
        invalid_version: Option<String>,
        valid_version: String,
    },

    #[error("3DS configuration is missing '{missing_key}'")]
    MissingConfiguration { missing_key: String },

    #[error("{}", .0.description)]
    SdkFailure(ThreeDsErrorInfo),

    #[error("3DS failed: {0}")]
    Underlying(ForeignError),
}

/// A 3-D Secure failure plus the bridge metadata needed to investigate it
#[derive(Debug, PartialEq, Error)]
#[error("{kind}")]
pub struct ThreeDsError {
    pub kind: ThreeDsErrorKind,
    pub payment_method_type: Option<String>,
    pub sdk_version: Option<String>,
    pub sdk_provider: Option<String>,
    pub init_protocol_version: Option<String>,
}

impl ThreeDsError {
    pub fn new(kind: ThreeDsErrorKind) -> Self {
        Self {
            kind,
            payment_method_type: None,
            sdk_version: None,
            sdk_provider: None,
            init_protocol_version: None,
        }
    }

    pub fn with_payment_method_type(mut self, payment_method_type: impl Into<String>) -> Self {
        self.payment_method_type = Some(payment_method_type.into());
        self
    }

    pub fn with_sdk(mut self, provider: impl Into<String>, version: impl Into<String>) -> Self {
        self.sdk_provider = Some(provider.into());
        self.sdk_version = Some(version.into());
        self
    }

    pub fn with_init_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.init_protocol_version = Some(version.into());
        self
    }

    /// Native error details, when the SDK produced them
    pub fn sdk_error_info(&self) -> Option<&ThreeDsErrorInfo> {
        match &self.kind {
            ThreeDsErrorKind::SdkFailure(info) => Some(info),
            _ => None,
        }
    }
}

/// Third-party SDK failures, one variant per integrated SDK
#[derive(Debug, PartialEq, Error)]
pub enum BridgeError {
    #[error(transparent)]
    ThreeDs(ThreeDsError),

    #[error("Klarna did not approve the user")]
    KlarnaUserNotApproved,

    #[error("Klarna SDK error: {0}")]
    Klarna(NativeFailure),

    #[error("Stripe SDK error: {0}")]
    Stripe(NativeFailure),

    #[error("IPay88 SDK error: {0}")]
    Ipay88(NativeFailure),

    #[error("Nol Pay SDK error: {0}")]
    Nol(NativeFailure),
}

impl BridgeError {
    /// Name of the bridged SDK
    pub fn sdk(&self) -> &'static str {
        match self {
            Self::ThreeDs(_) => "3DS",
            Self::KlarnaUserNotApproved | Self::Klarna(_) => "Klarna",
            Self::Stripe(_) => "Stripe",
            Self::Ipay88(_) => "IPay88",
            Self::Nol(_) => "NolPay",
        }
    }

    pub fn native_failure(&self) -> Option<&NativeFailure> {
        match self {
            Self::Klarna(failure)
            | Self::Stripe(failure)
            | Self::Ipay88(failure)
            | Self::Nol(failure) => Some(failure),
            Self::ThreeDs(_) | Self::KlarnaUserNotApproved => None,
        }
    }
}

impl ErrorDetails for BridgeError {
    fn error_id(&self) -> String {
        match self {
            Self::ThreeDs(error) => match &error.kind {
                ThreeDsErrorKind::MissingSdkDependency => "missing-sdk-dependency".into(),
                ThreeDsErrorKind::InvalidSdkVersion { .. } => "invalid-3ds-sdk-version".into(),
                ThreeDsErrorKind::MissingConfiguration { .. } => "missing-3ds-configuration".into(),
                ThreeDsErrorKind::SdkFailure(info) if !info.error_id.trim().is_empty() => {
                    info.error_id.clone()
                }
                ThreeDsErrorKind::SdkFailure(_) => "3ds-sdk-error".into(),
                ThreeDsErrorKind::Underlying(_) => "3ds-underlying-error".into(),
            },
            Self::KlarnaUserNotApproved => "klarna-user-not-approved".into(),
            Self::Klarna(_) => "klarna-sdk-error".into(),
            Self::Stripe(_) => "stripe-sdk-error".into(),
            Self::Ipay88(_) => "ipay88-sdk-error".into(),
            Self::Nol(_) => "nol-sdk-error".into(),
        }
    }

    fn payment_method_type(&self) -> Option<&str> {
        match self {
            Self::ThreeDs(error) => Some(
                error
                    .payment_method_type
                    .as_deref()
                    .unwrap_or(payment_method::PAYMENT_CARD),
            ),
            Self::KlarnaUserNotApproved | Self::Klarna(_) => Some(payment_method::KLARNA),
            Self::Stripe(_) => Some(payment_method::STRIPE_ACH),
            Self::Ipay88(_) => Some(payment_method::IPAY88_CARD),
            Self::Nol(_) => Some(payment_method::NOL_PAY),
        }
    }

    fn variant_info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("sdk".into(), Value::from(self.sdk()));
        match self {
            Self::ThreeDs(error) => match &error.kind {
                ThreeDsErrorKind::InvalidSdkVersion {
                    invalid_version,
                    valid_version,
                } => {
                    insert_opt(&mut info, "invalidVersion", invalid_version);
                    info.insert("validVersion".into(), Value::from(valid_version.as_str()));
                }
                ThreeDsErrorKind::MissingConfiguration { missing_key } => {
                    info.insert("missingKey".into(), Value::from(missing_key.as_str()));
                }
                ThreeDsErrorKind::Underlying(native) => {
                    info.insert("nativeError".into(), Value::from(native.to_string()));
                }
                ThreeDsErrorKind::SdkFailure(details) => {
                    insert_opt(&mut info, "detail", &details.detail);
                }
                ThreeDsErrorKind::MissingSdkDependency => {}
            },
            Self::Klarna(failure) | Self::Stripe(failure) | Self::Ipay88(failure) | Self::Nol(failure) => {
                insert_opt(&mut info, "nativeErrorCode", &failure.code);
                if let Some(native) = &failure.native {
                    info.insert("nativeError".into(), Value::from(native.to_string()));
                }
            }
            Self::KlarnaUserNotApproved => {}
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_ds_sdk_failure_uses_native_error_id() {
        let error = BridgeError::ThreeDs(ThreeDsError::new(ThreeDsErrorKind::SdkFailure(
            ThreeDsErrorInfo {
                error_id: "3ds-challenge-failed".into(),
                description: "Challenge failed".into(),
                ..Default::default()
            },
        )));

        assert_eq!(error.error_id(), "3ds-challenge-failed");
        assert_eq!(error.to_string(), "Challenge failed");
        assert_eq!(error.payment_method_type(), Some(payment_method::PAYMENT_CARD));
    }

    #[test]
    fn test_blank_native_error_id_falls_back() {
        let error = BridgeError::ThreeDs(ThreeDsError::new(ThreeDsErrorKind::SdkFailure(
            ThreeDsErrorInfo::default(),
        )));
        assert_eq!(error.error_id(), "3ds-sdk-error");
    }

    #[test]
    fn test_bridges_infer_payment_method() {
        let nol = BridgeError::Nol(NativeFailure::new("Card locked").with_code("A1"));

        assert_eq!(nol.error_id(), "nol-sdk-error");
        assert_eq!(nol.payment_method_type(), Some(payment_method::NOL_PAY));
        assert_eq!(nol.variant_info().get("nativeErrorCode"), Some(&Value::from("A1")));
        assert_eq!(
            BridgeError::KlarnaUserNotApproved.payment_method_type(),
            Some(payment_method::KLARNA)
        );
    }

    #[test]
    fn test_native_error_is_kept_as_context() {
        let native = ForeignError::from_boxed("IPay88 session expired".into());
        let error = BridgeError::Ipay88(
            NativeFailure::new("Payment could not be completed")
                .with_code("E42")
                .with_native(native),
        );
        let info = error.variant_info();

        assert_eq!(error.error_id(), "ipay88-sdk-error");
        assert_eq!(info.get("nativeErrorCode"), Some(&Value::from("E42")));
        assert_eq!(info.get("nativeError"), Some(&Value::from("IPay88 session expired")));
        assert_eq!(
            error.native_failure().and_then(|f| f.native.as_ref()).map(|n| n.type_name()),
            Some("dyn Error")
        );
    }

    #[test]
    fn test_three_ds_payment_method_can_be_overridden() {
        let error = BridgeError::ThreeDs(
            ThreeDsError::new(ThreeDsErrorKind::MissingSdkDependency)
                .with_payment_method_type(payment_method::IPAY88_CARD),
        );
        assert_eq!(error.payment_method_type(), Some(payment_method::IPAY88_CARD));
    }
}
