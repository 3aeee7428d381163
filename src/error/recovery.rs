//! Recovery suggestions for canonical errors
//!
//! A static mapping keyed by variant. Free-form `info` is never consulted.

use crate::error::bridge::{BridgeError, ThreeDsErrorKind};
use crate::error::network::NetworkError;
use crate::error::taxonomy::{FlowError, SessionError};
use crate::error::{ErrorKind, PaymentError};

/// Actionable suggestion for the developer or support staff, if any
pub fn recovery_suggestion(error: &PaymentError) -> Option<String> {
    match error.kind() {
        ErrorKind::Session(session) => session_suggestion(session),
        // Shown next to the field instead
        ErrorKind::Validation(_) => None,
        ErrorKind::Flow(flow) => flow_suggestion(flow),
        ErrorKind::Network(network) => network_suggestion(network),
        ErrorKind::Bridge(bridge) => bridge_suggestion(bridge),
        ErrorKind::Internal(wrapper) => recovery_suggestion(wrapper.inner()),
        ErrorKind::Aggregate(_) => {
            Some("Check the underlying errors for more information.".to_string())
        }
        ErrorKind::Unknown => Some(format!(
            "Contact support and provide diagnostics id {}",
            error.diagnostics_id()
        )),
    }
}

fn session_suggestion(error: &SessionError) -> Option<String> {
    let suggestion = match error {
        SessionError::Uninitialized => {
            "Make sure you have called the SDK start method before using it.".to_string()
        }
        SessionError::InvalidClientToken => {
            "Check that the client token is valid and has not expired.".to_string()
        }
        SessionError::MissingConfiguration => {
            "Check that a configuration has been fetched for this session.".to_string()
        }
        SessionError::MissingDelegate => {
            "Set a checkout delegate before starting a payment.".to_string()
        }
        SessionError::MisconfiguredPaymentMethods => {
            "Make sure the payment methods are enabled in the dashboard.".to_string()
        }
        SessionError::MissingInputElement { element } => {
            format!("Add an input element of type {element} to the form.")
        }
        SessionError::InvalidClientSessionValue { name, .. } => {
            format!("Check that '{name}' is set correctly in the client session.")
        }
        SessionError::InvalidMerchantIdentifier { .. } => {
            "Check that the merchant identifier matches the one in your Apple Pay setup.".to_string()
        }
        SessionError::InvalidValue { key, .. } => format!("Check the value provided for '{key}'."),
        SessionError::InvalidUrl { .. } => "Provide a valid URL.".to_string(),
        SessionError::MissingSdk { sdk_name, .. } => {
            format!("Add the {sdk_name} dependency to your project.")
        }
        SessionError::InvalidVaultedPaymentMethodId { .. } => {
            "Use the id of a payment method vaulted for this customer.".to_string()
        }
    };
    Some(suggestion)
}

fn flow_suggestion(error: &FlowError) -> Option<String> {
    match error {
        FlowError::Cancelled { .. } => None,
        FlowError::UnsupportedIntent { intent } => {
            Some(format!("Change the intent to {}", intent.other()))
        }
        FlowError::UnsupportedPaymentMethod { .. } => Some(
            "Make sure the payment method type is supported and enabled for this session."
                .to_string(),
        ),
        FlowError::UnsupportedPaymentMethodForManager { manager, .. } => Some(format!(
            "Use a manager that supports this payment method instead of {manager}."
        )),
        FlowError::UnableToPresentPaymentMethod { .. } => Some(
            "Check that the payment method is available for the current session.".to_string(),
        ),
        FlowError::UnableToMakePaymentsOnProvidedNetworks => Some(
            "Check the card networks supported by the merchant and the user's wallet.".to_string(),
        ),
        FlowError::ApplePayTimedOut => Some("Present the Apple Pay sheet again.".to_string()),
        FlowError::ApplePayNoCardsInWallet => {
            Some("Ask the user to add a card to their Apple Pay wallet.".to_string())
        }
        FlowError::ApplePayDeviceNotSupported => {
            Some("Offer a different payment method on this device.".to_string())
        }
        FlowError::ApplePayPresentationFailed { .. } => {
            Some("Check the Apple Pay configuration and try again.".to_string())
        }
        FlowError::PaymentFailed { .. } | FlowError::FailedToProcessPayment { .. } => None,
        FlowError::FailedToCreatePayment { .. } | FlowError::FailedToResumePayment { .. } => {
            Some("Check the payment details and the server response.".to_string())
        }
        FlowError::FailedToCreateSession { .. } => {
            Some("Check the client session request and try again.".to_string())
        }
        FlowError::MerchantError { .. } => None,
    }
}

fn network_suggestion(error: &NetworkError) -> Option<String> {
    match error {
        NetworkError::Unauthorized { .. } => {
            Some("Check that the client token is valid and has not expired.".to_string())
        }
        NetworkError::ServerError { .. } => None,
        NetworkError::FailedToDecode { .. }
        | NetworkError::FailedToEncode { .. }
        | NetworkError::NoData => None,
        NetworkError::Connectivity { .. } => {
            Some("Check the network connection and try again.".to_string())
        }
    }
}

fn bridge_suggestion(error: &BridgeError) -> Option<String> {
    match error {
        BridgeError::ThreeDs(three_ds) => match &three_ds.kind {
            ThreeDsErrorKind::MissingSdkDependency => {
                Some("Add the 3DS SDK dependency to your project.".to_string())
            }
            ThreeDsErrorKind::InvalidSdkVersion { valid_version, .. } => {
                Some(format!("Update the 3DS SDK to version {valid_version}."))
            }
            ThreeDsErrorKind::MissingConfiguration { missing_key } => Some(format!(
                "Make sure '{missing_key}' is set in the 3DS configuration."
            )),
            ThreeDsErrorKind::SdkFailure(info) => info.recovery_suggestion.clone(),
            ThreeDsErrorKind::Underlying(_) => None,
        },
        BridgeError::KlarnaUserNotApproved => None,
        BridgeError::Klarna(_)
        | BridgeError::Stripe(_)
        | BridgeError::Ipay88(_)
        | BridgeError::Nol(_) => None,
    }
}
