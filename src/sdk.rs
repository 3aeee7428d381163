//! SDK start-up: logging plus the default handler chain

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::info;

use crate::config::SdkSettings;
use crate::handlers::{
    AnalyticsHandler, AnalyticsSink, CheckoutDelegate, DelegateHandler, HandlerRegistry,
    LoggingHandler, ResultPresenter, UiTriggerHandler, default_handlers,
};
use crate::logging::init_tracing;

static STARTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("the SDK has already been started")]
    AlreadyStarted,
}

/// Host integrations wired into the default handlers
#[derive(Default, Clone)]
pub struct SdkHooks {
    pub delegate: Option<Arc<dyn CheckoutDelegate>>,
    pub presenter: Option<Arc<dyn ResultPresenter>>,
    pub analytics: Option<Arc<dyn AnalyticsSink>>,
}

/// Register the built-in handlers on `registry` in their fixed order:
/// logging, analytics, delegate, UI
pub fn register_defaults(registry: &HandlerRegistry, settings: &SdkSettings, hooks: SdkHooks) {
    registry.register(Arc::new(LoggingHandler));
    if let Some(sink) = hooks.analytics {
        if settings.analytics_enabled {
            registry.register(Arc::new(AnalyticsHandler::new(sink)));
        } else {
            info!("Analytics disabled by configuration");
        }
    }
    if let Some(delegate) = hooks.delegate {
        registry.register(Arc::new(DelegateHandler::new(delegate)));
    }
    if let Some(presenter) = hooks.presenter {
        registry.register(Arc::new(UiTriggerHandler::new(presenter)));
    }
}

/// Initialise logging and the process-wide handler chain. Runs once.
pub fn start(settings: &SdkSettings, hooks: SdkHooks) -> Result<&'static HandlerRegistry, StartupError> {
    if STARTED.swap(true, Ordering::SeqCst) {
        return Err(StartupError::AlreadyStarted);
    }
    init_tracing(settings);

    let registry = default_handlers();
    register_defaults(registry, settings, hooks);
    info!(
        environment = %settings.environment,
        handlers = ?registry.handler_names(),
        "Payment SDK error handling started"
    );
    Ok(registry)
}
