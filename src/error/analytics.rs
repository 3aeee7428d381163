//! Analytics context and event payloads derived from canonical errors
//!
//! Both functions here are pure: the same error always yields the same map,
//! so the context can be computed once for logging and again for telemetry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::bridge::{BridgeError, ThreeDsError};
use crate::error::{ErrorClass, ErrorKind, ErrorSeverity, InfoMap, PaymentError};

pub const ERROR_ID_KEY: &str = "errorId";
pub const PAYMENT_METHOD_TYPE_KEY: &str = "paymentMethodType";

/// Context map attached to analytics events and log records
pub fn analytics_context(error: &PaymentError) -> InfoMap {
    let mut context = InfoMap::new();
    context.insert(ERROR_ID_KEY.into(), Value::from(error.error_id()));
    if let Some(payment_method_type) = error.payment_method_type() {
        context.insert(PAYMENT_METHOD_TYPE_KEY.into(), Value::from(payment_method_type));
    }
    if let Some(three_ds) = three_ds_source(error.kind()) {
        insert_three_ds(&mut context, three_ds);
    }
    context
}

// Wrappers are never surfaced but a report built before normalization should
// still carry the bridge metadata
fn three_ds_source(kind: &ErrorKind) -> Option<&ThreeDsError> {
    match kind {
        ErrorKind::Bridge(BridgeError::ThreeDs(error)) => Some(error),
        ErrorKind::Internal(wrapper) => three_ds_source(wrapper.inner().kind()),
        _ => None,
    }
}

fn insert_three_ds(context: &mut InfoMap, error: &ThreeDsError) {
    let mut put = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            context.insert(key.to_string(), Value::from(value));
        }
    };
    put("initProtocolVersion", error.init_protocol_version.as_deref());
    put("threeDsSdkVersion", error.sdk_version.as_deref());
    put("threeDsSdkProvider", error.sdk_provider.as_deref());

    if let Some(info) = error.sdk_error_info() {
        put("threeDsErrorType", info.error_type.as_deref());
        put("threeDsErrorComponent", info.component.as_deref());
        put("threeDsSdkTransactionId", info.transaction_id.as_deref());
        put("threeDsErrorDetail", info.detail.as_deref());
        put("threeDsProtocolVersion", info.protocol_version.as_deref());
        if let Some(code) = info.code {
            context.insert("threeDsErrorCode".into(), Value::from(code));
        }
    }
}

/// Kind of analytics message emitted for an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Error,
    PaymentCancelled,
}

/// Message event sent to the analytics backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub message: String,
    pub message_type: MessageType,
    pub severity: ErrorSeverity,
    pub diagnostics_id: String,
    #[serde(flatten)]
    pub context: InfoMap,
}

impl AnalyticsEvent {
    pub fn from_error(error: &PaymentError) -> Self {
        let class = error.class();
        let message_type = match class {
            ErrorClass::UserDriven => MessageType::PaymentCancelled,
            _ => MessageType::Error,
        };
        Self {
            message: error.description(),
            message_type,
            severity: class.severity(),
            diagnostics_id: error.diagnostics_id().to_string(),
            context: analytics_context(error),
        }
    }

    pub fn error_id(&self) -> Option<&str> {
        self.context.get(ERROR_ID_KEY).and_then(Value::as_str)
    }

    pub fn payment_method_type(&self) -> Option<&str> {
        self.context.get(PAYMENT_METHOD_TYPE_KEY).and_then(Value::as_str)
    }
}
