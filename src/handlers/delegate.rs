//! Forwarding to the host application's checkout delegate

use std::sync::Arc;

use super::{ErrorHandler, HandlerError};
use crate::error::PaymentError;

/// Callback surface implemented by the host application
pub trait CheckoutDelegate: Send + Sync {
    /// The only channel through which the host learns of asynchronous failures
    fn on_resume_error(&self, error: &PaymentError);
}

pub struct DelegateHandler {
    delegate: Arc<dyn CheckoutDelegate>,
}

impl DelegateHandler {
    pub fn new(delegate: Arc<dyn CheckoutDelegate>) -> Self {
        Self { delegate }
    }
}

impl ErrorHandler for DelegateHandler {
    fn name(&self) -> &str {
        "delegate"
    }

    fn handle(&self, error: Option<&PaymentError>) -> Result<(), HandlerError> {
        if let Some(error) = error {
            self.delegate.on_resume_error(error);
        }
        Ok(())
    }
}
