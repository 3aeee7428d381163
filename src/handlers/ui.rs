//! Result screen triggers
//!
//! The presenter is responsible for hopping onto the UI thread itself.

use std::sync::Arc;

use super::{ErrorHandler, HandlerError};
use crate::error::{ErrorClass, PaymentError};

/// Result screens owned by the host UI
pub trait ResultPresenter: Send + Sync {
    fn show_success(&self);
    fn show_failure(&self, error: &PaymentError);
    fn dismiss(&self);
}

pub struct UiTriggerHandler {
    presenter: Arc<dyn ResultPresenter>,
}

impl UiTriggerHandler {
    pub fn new(presenter: Arc<dyn ResultPresenter>) -> Self {
        Self { presenter }
    }
}

impl ErrorHandler for UiTriggerHandler {
    fn name(&self) -> &str {
        "ui-trigger"
    }

    fn handle(&self, error: Option<&PaymentError>) -> Result<(), HandlerError> {
        match error {
            None => self.presenter.show_success(),
            // Cancellation is an expected outcome, not a failure screen
            Some(error) if error.class() == ErrorClass::UserDriven => self.presenter.dismiss(),
            Some(error) => self.presenter.show_failure(error),
        }
        Ok(())
    }
}
