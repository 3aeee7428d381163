//! Handler chain: the single place where errors cause side effects
//!
//! A [`HandlerRegistry`] owns an ordered, append-only list of handlers.
//! Dispatch works on a snapshot of that list so concurrent registration never
//! exposes a half-updated chain. Each handler is isolated: an `Err` or a panic
//! is logged and counted, and the remaining handlers still run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::PaymentError;
use crate::error::normalize::{RawError, normalize};

pub mod analytics;
pub mod delegate;
pub mod logging;
pub mod ui;

pub use analytics::{AnalyticsHandler, AnalyticsSink, AnalyticsTransport, ChannelAnalyticsSink};
pub use delegate::{CheckoutDelegate, DelegateHandler};
pub use logging::LoggingHandler;
pub use ui::{ResultPresenter, UiTriggerHandler};

/// Failure reported by a handler; never propagated past the chain
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler is unavailable: {0}")]
    Unavailable(String),

    #[error("handler failed: {0}")]
    Failed(String),
}

/// A consumer invoked once per canonical error
pub trait ErrorHandler: Send + Sync {
    fn name(&self) -> &str;

    /// `None` signals that the operation completed without error
    fn handle(&self, error: Option<&PaymentError>) -> Result<(), HandlerError>;
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Handlers that returned `Ok`
    pub delivered: usize,
    /// Handlers that returned `Err` or panicked
    pub failed: usize,
}

impl DispatchSummary {
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Ordered, append-only handler list
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<Vec<Arc<dyn ErrorHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler; there is no removal
    pub fn register(&self, handler: Arc<dyn ErrorHandler>) {
        debug!(handler = handler.name(), "Registering error handler");
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|handler| handler.name().to_string())
            .collect()
    }

    fn snapshot(&self) -> Vec<Arc<dyn ErrorHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Invoke the registered handlers, then `extra`, in order
    pub fn dispatch(
        &self,
        error: Option<&PaymentError>,
        extra: &[Arc<dyn ErrorHandler>],
    ) -> DispatchSummary {
        let handlers = self.snapshot();
        let mut summary = DispatchSummary::default();
        for handler in handlers.iter().chain(extra) {
            if invoke(handler.as_ref(), error) {
                summary.delivered += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    /// Normalize a raw failure, dispatch it and hand back the canonical error
    pub fn report(
        &self,
        raw: impl Into<RawError>,
        extra: &[Arc<dyn ErrorHandler>],
    ) -> PaymentError {
        let error = normalize(raw);
        let summary = self.dispatch(Some(&error), extra);
        if summary.failed > 0 {
            warn!(
                diagnostics_id = error.diagnostics_id(),
                failed = summary.failed,
                "Some error handlers failed"
            );
        }
        error
    }
}

fn invoke(handler: &dyn ErrorHandler, error: Option<&PaymentError>) -> bool {
    match catch_unwind(AssertUnwindSafe(|| handler.handle(error))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(handler = handler.name(), error = %e, "Error handler failed");
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(handler = handler.name(), panic = %message, "Error handler panicked");
            false
        }
    }
}

static DEFAULT_HANDLERS: OnceLock<HandlerRegistry> = OnceLock::new();

/// Process-wide registry used when no explicit registry is passed around
pub fn default_handlers() -> &'static HandlerRegistry {
    DEFAULT_HANDLERS.get_or_init(HandlerRegistry::new)
}

/// Dispatch through the process-wide registry
pub fn dispatch(error: Option<&PaymentError>, extra: &[Arc<dyn ErrorHandler>]) -> DispatchSummary {
    default_handlers().dispatch(error, extra)
}

/// Normalize and dispatch through the process-wide registry
pub fn report(raw: impl Into<RawError>, extra: &[Arc<dyn ErrorHandler>]) -> PaymentError {
    default_handlers().report(raw, extra)
}
