use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// Error modules
pub mod analytics;
pub mod bridge;
pub mod diagnostics;
pub mod network;
pub mod normalize;
pub mod recovery;
pub mod reporter;
pub mod taxonomy;
pub mod validation;

use bridge::{BridgeError, ThreeDsError};
use diagnostics::{CREATED_AT_KEY, Diagnostics};
use network::{NetworkError, ServerErrorPayload};
use taxonomy::{FlowError, SessionError, SessionIntent};
use validation::ValidationError;

macro_rules! from_family {
    ($family:ty, $variant:path) => {
        impl From<$family> for PaymentError {
            fn from(e: $family) -> Self {
                PaymentError::new($variant(e))
            }
        }
    };
}

/// Free-form metadata attached to an error
pub type InfoMap = serde_json::Map<String, Value>;

/// Capability shared by every error family
pub trait ErrorDetails {
    /// Stable kebab-case identifier of the failure
    fn error_id(&self) -> String;

    /// Payment method the failure is tied to, explicit or inferred
    fn payment_method_type(&self) -> Option<&str> {
        None
    }

    /// Variant-specific metadata merged into `info`
    fn variant_info(&self) -> InfoMap {
        InfoMap::new()
    }
}

/// A failure produced outside this SDK, kept opaque
pub struct ForeignError {
    type_name: &'static str,
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl ForeignError {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<E>(),
            inner: Box::new(error),
        }
    }

    pub fn from_boxed(inner: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self {
            type_name: "dyn Error",
            inner,
        }
    }

    /// Rust type name of the wrapped error at the point it was captured
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl Display for ForeignError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl Debug for ForeignError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignError")
            .field("type_name", &self.type_name)
            .field("message", &self.inner.to_string())
            .finish()
    }
}

impl PartialEq for ForeignError {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.inner.to_string() == other.inner.to_string()
    }
}

impl StdError for ForeignError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Member of an aggregate error
#[derive(Debug, PartialEq)]
pub enum Underlying {
    Sdk(PaymentError),
    Foreign(ForeignError),
}

impl Display for Underlying {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sdk(error) => write!(f, "{}", error.kind),
            Self::Foreign(error) => write!(f, "{error}"),
        }
    }
}

impl From<PaymentError> for Underlying {
    fn from(error: PaymentError) -> Self {
        Self::Sdk(error)
    }
}

impl From<ForeignError> for Underlying {
    fn from(error: ForeignError) -> Self {
        Self::Foreign(error)
    }
}

/// SDK-internal wrappers that are never exposed to the host application
#[derive(Debug, PartialEq, Error)]
pub enum InternalError {
    #[error("Failed to perform 3DS but should continue: {}", .0.kind)]
    ThreeDsShouldContinue(Box<PaymentError>),

    #[error("Failed to perform 3DS and should break: {}", .0.kind)]
    ThreeDsShouldBreak(Box<PaymentError>),
}

impl InternalError {
    pub fn inner(&self) -> &PaymentError {
        match self {
            Self::ThreeDsShouldContinue(inner) | Self::ThreeDsShouldBreak(inner) => inner,
        }
    }

    pub fn into_inner(self) -> PaymentError {
        match self {
            Self::ThreeDsShouldContinue(inner) | Self::ThreeDsShouldBreak(inner) => *inner,
        }
    }
}

/// Closed set of failure kinds
#[derive(Debug, PartialEq, Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Session(SessionError),

    #[error(transparent)]
    Validation(ValidationError),

    #[error(transparent)]
    Flow(FlowError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Bridge(BridgeError),

    #[error(transparent)]
    Internal(InternalError),

    #[error("{}", describe_underlying(.0))]
    Aggregate(Vec<Underlying>),

    #[error("Something went wrong")]
    Unknown,
}

fn describe_underlying(errors: &[Underlying]) -> String {
    match errors {
        [] => "No underlying errors were reported".to_string(),
        [single] => format!("Underlying error: {single}"),
        many => {
            let messages: Vec<String> = many.iter().map(|e| e.to_string()).collect();
            format!("Multiple errors occurred: {}", messages.join(" | "))
        }
    }
}

impl ErrorDetails for ErrorKind {
    fn error_id(&self) -> String {
        match self {
            Self::Session(e) => e.error_id(),
            Self::Validation(e) => e.error_id(),
            Self::Flow(e) => e.error_id(),
            Self::Network(e) => e.error_id(),
            Self::Bridge(e) => e.error_id(),
            Self::Internal(InternalError::ThreeDsShouldContinue(_)) => {
                "failed-to-perform-3ds-but-should-continue".to_string()
            }
            Self::Internal(InternalError::ThreeDsShouldBreak(_)) => {
                "failed-to-perform-3ds-and-should-break".to_string()
            }
            Self::Aggregate(_) => "generic-underlying-errors".to_string(),
            Self::Unknown => "unknown".to_string(),
        }
    }

    fn payment_method_type(&self) -> Option<&str> {
        match self {
            Self::Session(e) => e.payment_method_type(),
            Self::Validation(e) => e.payment_method_type(),
            Self::Flow(e) => e.payment_method_type(),
            Self::Network(e) => e.payment_method_type(),
            Self::Bridge(e) => e.payment_method_type(),
            Self::Internal(wrapper) => wrapper.inner().kind.payment_method_type(),
            Self::Aggregate(_) | Self::Unknown => None,
        }
    }

    fn variant_info(&self) -> InfoMap {
        match self {
            Self::Session(e) => e.variant_info(),
            Self::Validation(e) => e.variant_info(),
            Self::Flow(e) => e.variant_info(),
            Self::Network(e) => e.variant_info(),
            Self::Bridge(e) => e.variant_info(),
            Self::Internal(wrapper) => {
                let mut info = InfoMap::new();
                let inner = wrapper.inner();
                info.insert("wrappedErrorId".into(), Value::from(inner.error_id()));
                info
            }
            Self::Aggregate(errors) => {
                let mut info = InfoMap::new();
                let members: Vec<Value> = errors
                    .iter()
                    .map(|member| match member {
                        Underlying::Sdk(error) => Value::from(error.error_id()),
                        Underlying::Foreign(error) => Value::from(error.type_name()),
                    })
                    .collect();
                info.insert("underlyingErrorCount".into(), Value::from(errors.len()));
                info.insert("underlyingErrors".into(), Value::from(members));
                info
            }
            Self::Unknown => InfoMap::new(),
        }
    }
}

/// How an error should be treated by handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Programmer or configuration errors, surfaced immediately
    Configuration,
    /// Expected outcomes driven by the user, such as cancellation
    UserDriven,
    /// Network failures that a caller may retry
    Transient,
    /// Rejected input, recoverable by re-collecting it
    Validation,
    /// Opaque failures of an integrated third-party SDK
    ThirdParty,
    /// Declined or failed payments
    Payment,
    /// Anything that could not be classified
    Unknown,
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
}

impl ErrorSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl ErrorClass {
    pub fn severity(self) -> ErrorSeverity {
        match self {
            Self::UserDriven => ErrorSeverity::Info,
            Self::Validation => ErrorSeverity::Warning,
            Self::Configuration
            | Self::Transient
            | Self::ThirdParty
            | Self::Payment
            | Self::Unknown => ErrorSeverity::Error,
        }
    }

    /// Only transient failures are worth a caller-side retry
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// The canonical error surfaced to handlers and the host application
#[derive(Debug, PartialEq)]
pub struct PaymentError {
    kind: ErrorKind,
    diagnostics: Diagnostics,
    extra_info: InfoMap,
}

from_family!(SessionError, ErrorKind::Session);
from_family!(ValidationError, ErrorKind::Validation);
from_family!(FlowError, ErrorKind::Flow);
from_family!(NetworkError, ErrorKind::Network);
from_family!(BridgeError, ErrorKind::Bridge);

impl PaymentError {
    /// Create an error for a new failure, minting a diagnostics id
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_diagnostics(kind, Diagnostics::new())
    }

    pub fn with_diagnostics(kind: ErrorKind, diagnostics: Diagnostics) -> Self {
        Self {
            kind,
            diagnostics,
            extra_info: InfoMap::new(),
        }
    }

    /// Attach free-form metadata; `createdAt` can never be replaced
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != CREATED_AT_KEY {
            self.extra_info.insert(key, value.into());
        }
        self
    }

    pub fn uninitialized_session() -> Self {
        SessionError::Uninitialized.into()
    }

    pub fn invalid_client_token() -> Self {
        SessionError::InvalidClientToken.into()
    }

    pub fn missing_sdk(payment_method_type: impl Into<String>, sdk_name: impl Into<String>) -> Self {
        SessionError::MissingSdk {
            payment_method_type: payment_method_type.into(),
            sdk_name: sdk_name.into(),
        }
        .into()
    }

    pub fn cancelled(payment_method_type: impl Into<String>) -> Self {
        FlowError::Cancelled {
            payment_method_type: payment_method_type.into(),
        }
        .into()
    }

    pub fn unsupported_intent(intent: SessionIntent) -> Self {
        FlowError::UnsupportedIntent { intent }.into()
    }

    pub fn unsupported_payment_method(payment_method_type: impl Into<String>) -> Self {
        FlowError::UnsupportedPaymentMethod {
            payment_method_type: payment_method_type.into(),
        }
        .into()
    }

    pub fn failed_to_create_payment(
        payment_method_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        FlowError::FailedToCreatePayment {
            payment_method_type: payment_method_type.into(),
            description: description.into(),
        }
        .into()
    }

    pub fn failed_to_resume_payment(
        payment_method_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        FlowError::FailedToResumePayment {
            payment_method_type: payment_method_type.into(),
            description: description.into(),
        }
        .into()
    }

    pub fn unauthorized(url: impl Into<String>, method: impl Into<String>) -> Self {
        NetworkError::Unauthorized {
            url: url.into(),
            method: method.into(),
        }
        .into()
    }

    /// Server failure; a server-issued diagnostics id is kept as-is
    pub fn server_error(status: u16, response: Option<ServerErrorPayload>) -> Self {
        let diagnostics = response
            .as_ref()
            .and_then(|payload| payload.diagnostics_id())
            .map(Diagnostics::with_id)
            .unwrap_or_default();
        Self::with_diagnostics(
            ErrorKind::Network(NetworkError::ServerError { status, response }),
            diagnostics,
        )
    }

    pub fn connectivity(errors: Vec<ForeignError>) -> Self {
        NetworkError::Connectivity { errors }.into()
    }

    /// 3DS bridge failure; an id issued by the 3DS layer is authoritative
    pub fn three_ds(error: ThreeDsError, diagnostics_id: Option<String>) -> Self {
        let diagnostics = diagnostics_id.map(Diagnostics::with_id).unwrap_or_default();
        Self::with_diagnostics(ErrorKind::Bridge(BridgeError::ThreeDs(error)), diagnostics)
    }

    /// Wrap a 3DS failure after which the payment continues without 3DS
    pub fn three_ds_should_continue(inner: PaymentError) -> Self {
        let diagnostics = inner.diagnostics.clone();
        Self::with_diagnostics(
            ErrorKind::Internal(InternalError::ThreeDsShouldContinue(Box::new(inner))),
            diagnostics,
        )
    }

    /// Wrap a 3DS failure that must abort the payment
    pub fn three_ds_should_break(inner: PaymentError) -> Self {
        let diagnostics = inner.diagnostics.clone();
        Self::with_diagnostics(
            ErrorKind::Internal(InternalError::ThreeDsShouldBreak(Box::new(inner))),
            diagnostics,
        )
    }

    /// Several independent failures surfaced together
    pub fn underlying_errors(errors: Vec<PaymentError>) -> Self {
        Self::aggregate(errors.into_iter().map(Underlying::Sdk).collect())
    }

    pub fn aggregate(members: Vec<Underlying>) -> Self {
        Self::new(ErrorKind::Aggregate(members))
    }

    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn into_parts(self) -> (ErrorKind, Diagnostics, InfoMap) {
        (self.kind, self.diagnostics, self.extra_info)
    }

    pub(crate) fn from_parts(kind: ErrorKind, diagnostics: Diagnostics, extra_info: InfoMap) -> Self {
        Self {
            kind,
            diagnostics,
            extra_info,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn error_id(&self) -> String {
        self.kind.error_id()
    }

    pub fn diagnostics_id(&self) -> &str {
        self.diagnostics.id()
    }

    /// Human message without the support identifiers
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Developer-facing description including the support identifiers
    pub fn description(&self) -> String {
        format!(
            "[{}] {} (diagnosticsId: {})",
            self.error_id(),
            self.kind,
            self.diagnostics.id()
        )
    }

    pub fn recovery_suggestion(&self) -> Option<String> {
        recovery::recovery_suggestion(self)
    }

    pub fn analytics_context(&self) -> InfoMap {
        analytics::analytics_context(self)
    }

    pub fn payment_method_type(&self) -> Option<&str> {
        self.kind.payment_method_type()
    }

    /// Metadata with `createdAt` always present
    pub fn info(&self) -> InfoMap {
        let mut info = self.kind.variant_info();
        for (key, value) in &self.extra_info {
            info.entry(key.clone()).or_insert_with(|| value.clone());
        }
        info.insert(
            CREATED_AT_KEY.to_string(),
            Value::from(self.diagnostics.created_at_rfc3339()),
        );
        info
    }

    pub fn class(&self) -> ErrorClass {
        match &self.kind {
            ErrorKind::Session(_) => ErrorClass::Configuration,
            ErrorKind::Validation(_) => ErrorClass::Validation,
            ErrorKind::Flow(flow) => match flow {
                FlowError::Cancelled { .. } => ErrorClass::UserDriven,
                FlowError::UnsupportedIntent { .. }
                | FlowError::UnsupportedPaymentMethod { .. }
                | FlowError::UnsupportedPaymentMethodForManager { .. }
                | FlowError::UnableToPresentPaymentMethod { .. }
                | FlowError::UnableToMakePaymentsOnProvidedNetworks
                | FlowError::ApplePayDeviceNotSupported => ErrorClass::Configuration,
                FlowError::ApplePayTimedOut => ErrorClass::Transient,
                FlowError::ApplePayNoCardsInWallet
                | FlowError::ApplePayPresentationFailed { .. }
                | FlowError::PaymentFailed { .. }
                | FlowError::FailedToCreatePayment { .. }
                | FlowError::FailedToResumePayment { .. }
                | FlowError::FailedToProcessPayment { .. }
                | FlowError::FailedToCreateSession { .. }
                | FlowError::MerchantError { .. } => ErrorClass::Payment,
            },
            ErrorKind::Network(network) => match network {
                // An expired or wrong client token
                NetworkError::Unauthorized { .. } => ErrorClass::Configuration,
                network if network.is_retryable() => ErrorClass::Transient,
                NetworkError::ServerError { .. } => ErrorClass::Payment,
                NetworkError::FailedToDecode { .. }
                | NetworkError::FailedToEncode { .. }
                | NetworkError::NoData
                | NetworkError::Connectivity { .. } => ErrorClass::Unknown,
            },
            ErrorKind::Bridge(BridgeError::KlarnaUserNotApproved) => ErrorClass::Payment,
            ErrorKind::Bridge(_) => ErrorClass::ThirdParty,
            ErrorKind::Internal(wrapper) => wrapper.inner().class(),
            ErrorKind::Aggregate(errors) => {
                let mut classes = errors.iter().map(|member| match member {
                    Underlying::Sdk(error) => error.class(),
                    Underlying::Foreign(_) => ErrorClass::Unknown,
                });
                match classes.find(|class| *class != ErrorClass::Validation) {
                    Some(class) => class,
                    None if errors.is_empty() => ErrorClass::Unknown,
                    None => ErrorClass::Validation,
                }
            }
            ErrorKind::Unknown => ErrorClass::Unknown,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.class().severity()
    }

    /// Whether a caller-side retry may succeed
    pub fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self.kind, ErrorKind::Flow(FlowError::Cancelled { .. }))
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match &self.kind {
            ErrorKind::Validation(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for PaymentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl StdError for PaymentError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::Internal(wrapper) => Some(wrapper.inner()),
            ErrorKind::Aggregate(errors) => match errors.first() {
                Some(Underlying::Sdk(error)) => Some(error),
                Some(Underlying::Foreign(error)) => Some(error.get_ref()),
                None => None,
            },
            _ => None,
        }
    }
}

pub type Result<T, E = PaymentError> = core::result::Result<T, E>;
