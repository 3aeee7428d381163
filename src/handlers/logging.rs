use tracing::debug;

use super::{ErrorHandler, HandlerError};
use crate::error::PaymentError;
use crate::logging::log_error;

/// Structured console logger
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ErrorHandler for LoggingHandler {
    fn name(&self) -> &str {
        "logging"
    }

    fn handle(&self, error: Option<&PaymentError>) -> Result<(), HandlerError> {
        match error {
            Some(error) => log_error(error),
            None => debug!("Payment operation completed without error"),
        }
        Ok(())
    }
}
