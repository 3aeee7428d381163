//! Error taxonomy for session, configuration and payment-flow failures
//!
//! Each family is a closed enum. A new failure mode is a new variant with its
//! own stable `error_id`; there is no catch-all message bucket. The ids are a
//! public contract that host applications branch on, so existing ids are
//! never renamed.

use std::fmt::{Display, Formatter};

use serde_json::Value;
use thiserror::Error;

use crate::error::validation::InputElement;
use crate::error::{ErrorDetails, InfoMap};

/// Raw payment method type tags as issued by the payments API
pub mod payment_method {
    pub const APPLE_PAY: &str = "APPLE_PAY";
    pub const PAYMENT_CARD: &str = "PAYMENT_CARD";
    pub const KLARNA: &str = "KLARNA";
    pub const NOL_PAY: &str = "NOL_PAY";
    pub const IPAY88_CARD: &str = "IPAY88_CARD";
    pub const STRIPE_ACH: &str = "STRIPE_ACH";
}

/// Intent of the client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionIntent {
    /// One-off checkout
    Checkout,
    /// Vaulting a payment method for later use
    Vault,
}

impl SessionIntent {
    /// The intent a merchant should switch to when this one is unsupported
    pub fn other(self) -> Self {
        match self {
            Self::Checkout => Self::Vault,
            Self::Vault => Self::Checkout,
        }
    }
}

impl Display for SessionIntent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checkout => write!(f, "checkout"),
            Self::Vault => write!(f, "vault"),
        }
    }
}

/// Session and configuration errors raised before or outside a payment flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("SDK session has not been initialized")]
    Uninitialized,

    #[error("Client token is not valid")]
    InvalidClientToken,

    #[error("Missing SDK configuration")]
    MissingConfiguration,

    #[error("Checkout delegate has not been set")]
    MissingDelegate,

    #[error("Payment methods haven't been set up correctly")]
    MisconfiguredPaymentMethods,

    #[error("Missing input element {element}")]
    MissingInputElement { element: InputElement },

    #[error("Invalid client session value for '{name}'")]
    InvalidClientSessionValue {
        name: String,
        value: Option<String>,
        allowed_value: Option<String>,
    },

    #[error("Invalid merchant identifier")]
    InvalidMerchantIdentifier { merchant_identifier: Option<String> },

    #[error("Invalid value for key '{key}'")]
    InvalidValue {
        key: String,
        value: Option<String>,
        reason: Option<String>,
    },

    #[error("Invalid URL")]
    InvalidUrl { url: Option<String> },

    #[error("Missing SDK dependency {sdk_name} for {payment_method_type}")]
    MissingSdk {
        payment_method_type: String,
        sdk_name: String,
    },

    #[error("Vaulted payment method '{vaulted_payment_method_id}' is not valid")]
    InvalidVaultedPaymentMethodId { vaulted_payment_method_id: String },
}

impl ErrorDetails for SessionError {
    fn error_id(&self) -> String {
        match self {
            Self::Uninitialized => "uninitialized-sdk-session",
            Self::InvalidClientToken => "invalid-client-token",
            Self::MissingConfiguration => "missing-configuration",
            Self::MissingDelegate => "missing-delegate",
            Self::MisconfiguredPaymentMethods => "misconfigured-payment-methods",
            Self::MissingInputElement { .. } => "missing-input-element",
            Self::InvalidClientSessionValue { .. } => "invalid-client-session-value",
            Self::InvalidMerchantIdentifier { .. } => "invalid-merchant-identifier",
            Self::InvalidValue { .. } => "invalid-value",
            Self::InvalidUrl { .. } => "invalid-url",
            Self::MissingSdk { .. } => "missing-sdk-dependency",
            Self::InvalidVaultedPaymentMethodId { .. } => "invalid-vaulted-payment-method-id",
        }
        .to_string()
    }

    fn payment_method_type(&self) -> Option<&str> {
        match self {
            Self::MissingSdk {
                payment_method_type,
                ..
            } => Some(payment_method_type.as_str()),
            _ => None,
        }
    }

    fn variant_info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        match self {
            Self::MissingInputElement { element } => {
                info.insert("inputElement".into(), Value::from(element.as_str()));
            }
            Self::InvalidClientSessionValue {
                name,
                value,
                allowed_value,
            } => {
                info.insert("name".into(), Value::from(name.as_str()));
                insert_opt(&mut info, "value", value);
                insert_opt(&mut info, "allowedValue", allowed_value);
            }
            Self::InvalidMerchantIdentifier {
                merchant_identifier,
            } => insert_opt(&mut info, "merchantIdentifier", merchant_identifier),
            Self::InvalidValue { key, value, reason } => {
                info.insert("key".into(), Value::from(key.as_str()));
                insert_opt(&mut info, "value", value);
                insert_opt(&mut info, "reason", reason);
            }
            Self::InvalidUrl { url } => insert_opt(&mut info, "url", url),
            Self::MissingSdk { sdk_name, .. } => {
                info.insert("sdkName".into(), Value::from(sdk_name.as_str()));
            }
            Self::InvalidVaultedPaymentMethodId {
                vaulted_payment_method_id,
            } => {
                info.insert(
                    "vaultedPaymentMethodId".into(),
                    Value::from(vaulted_payment_method_id.as_str()),
                );
            }
            Self::Uninitialized
            | Self::InvalidClientToken
            | Self::MissingConfiguration
            | Self::MissingDelegate
            | Self::MisconfiguredPaymentMethods => {}
        }
        info
    }
}

/// Failures raised while a payment flow is running
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Payment method {payment_method_type} cancelled")]
    Cancelled { payment_method_type: String },

    #[error("Unsupported session intent {intent}")]
    UnsupportedIntent { intent: SessionIntent },

    #[error("Unsupported payment method type {payment_method_type}")]
    UnsupportedPaymentMethod { payment_method_type: String },

    #[error("Payment method {payment_method_type} is not supported by the {manager} manager")]
    UnsupportedPaymentMethodForManager {
        payment_method_type: String,
        manager: String,
    },

    #[error("Unable to present payment method {payment_method_type}")]
    UnableToPresentPaymentMethod { payment_method_type: String },

    #[error("Unable to make payments on the provided card networks")]
    UnableToMakePaymentsOnProvidedNetworks,

    #[error("Apple Pay sheet timed out")]
    ApplePayTimedOut,

    #[error("There are no cards in the Apple Pay wallet")]
    ApplePayNoCardsInWallet,

    #[error("This device does not support Apple Pay")]
    ApplePayDeviceNotSupported,

    #[error("Failed to present the Apple Pay sheet")]
    ApplePayPresentationFailed { reason: Option<String> },

    #[error("Payment {payment_id} failed with status {status}")]
    PaymentFailed {
        payment_method_type: Option<String>,
        payment_id: String,
        status: String,
    },

    #[error("Failed to create payment: {description}")]
    FailedToCreatePayment {
        payment_method_type: String,
        description: String,
    },

    #[error("Failed to resume payment: {description}")]
    FailedToResumePayment {
        payment_method_type: String,
        description: String,
    },

    #[error("Failed to process payment {payment_id} (status {status})")]
    FailedToProcessPayment {
        payment_method_type: Option<String>,
        payment_id: String,
        status: String,
    },

    #[error("Failed to create session: {reason}")]
    FailedToCreateSession { reason: String },

    #[error("Merchant error: {message}")]
    MerchantError { message: String },
}

impl ErrorDetails for FlowError {
    fn error_id(&self) -> String {
        match self {
            Self::Cancelled { .. } => "payment-cancelled",
            Self::UnsupportedIntent { .. } => "unsupported-session-intent",
            Self::UnsupportedPaymentMethod { .. } => "unsupported-payment-method-type",
            Self::UnsupportedPaymentMethodForManager { .. } => {
                "unsupported-payment-method-for-manager"
            }
            Self::UnableToPresentPaymentMethod { .. } => "unable-to-present-payment-method",
            Self::UnableToMakePaymentsOnProvidedNetworks => {
                "unable-to-make-payments-on-provided-networks"
            }
            Self::ApplePayTimedOut => "apple-pay-timed-out",
            Self::ApplePayNoCardsInWallet => "apple-pay-no-cards-in-wallet",
            Self::ApplePayDeviceNotSupported => "apple-pay-device-not-supported",
            Self::ApplePayPresentationFailed { .. } => "apple-pay-presentation-failed",
            Self::PaymentFailed { .. } => "payment-failed",
            Self::FailedToCreatePayment { .. } => "failed-to-create-payment",
            Self::FailedToResumePayment { .. } => "failed-to-resume-payment",
            Self::FailedToProcessPayment { .. } => "failed-to-process-payment",
            Self::FailedToCreateSession { .. } => "failed-to-create-session",
            Self::MerchantError { .. } => "merchant-error",
        }
        .to_string()
    }

    fn payment_method_type(&self) -> Option<&str> {
        match self {
            Self::Cancelled {
                payment_method_type,
            }
            | Self::UnsupportedPaymentMethod {
                payment_method_type,
            }
            | Self::UnsupportedPaymentMethodForManager {
                payment_method_type,
                ..
            }
            | Self::UnableToPresentPaymentMethod {
                payment_method_type,
            }
            | Self::FailedToCreatePayment {
                payment_method_type,
                ..
            }
            | Self::FailedToResumePayment {
                payment_method_type,
                ..
            } => Some(payment_method_type.as_str()),
            Self::PaymentFailed {
                payment_method_type,
                ..
            }
            | Self::FailedToProcessPayment {
                payment_method_type,
                ..
            } => payment_method_type.as_deref(),
            // Apple Pay only failures carry no explicit tag
            Self::UnableToMakePaymentsOnProvidedNetworks
            | Self::ApplePayTimedOut
            | Self::ApplePayNoCardsInWallet
            | Self::ApplePayDeviceNotSupported
            | Self::ApplePayPresentationFailed { .. } => Some(payment_method::APPLE_PAY),
            Self::UnsupportedIntent { .. }
            | Self::FailedToCreateSession { .. }
            | Self::MerchantError { .. } => None,
        }
    }

    fn variant_info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        match self {
            Self::UnsupportedIntent { intent } => {
                info.insert("intent".into(), Value::from(intent.to_string()));
            }
            Self::UnsupportedPaymentMethodForManager { manager, .. } => {
                info.insert("manager".into(), Value::from(manager.as_str()));
            }
            Self::ApplePayPresentationFailed { reason } => insert_opt(&mut info, "reason", reason),
            Self::PaymentFailed {
                payment_id, status, ..
            }
            | Self::FailedToProcessPayment {
                payment_id, status, ..
            } => {
                info.insert("paymentId".into(), Value::from(payment_id.as_str()));
                info.insert("status".into(), Value::from(status.as_str()));
            }
            _ => {}
        }
        info
    }
}

pub(crate) fn insert_opt(info: &mut InfoMap, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        info.insert(key.to_string(), Value::from(value.as_str()));
    }
}
