use std::io::Read;

use color_eyre::eyre::{self, WrapErr, eyre};
use tracing::info;

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod sdk;

#[cfg(test)]
mod tests;

pub use config::SdkSettings;
pub use error::analytics::{AnalyticsEvent, analytics_context};
pub use error::normalize::{RawError, classify_http_response, normalize};
pub use error::recovery::recovery_suggestion;
pub use error::reporter::ErrorReport;
pub use error::{ErrorClass, ErrorDetails, ErrorKind, ErrorSeverity, ForeignError, PaymentError};
pub use handlers::{DispatchSummary, ErrorHandler, HandlerRegistry, default_handlers};
pub use sdk::{SdkHooks, start};

const USAGE: &str = "usage: payment-diagnostics <status> [url] [method] < body.json";

/// Classify an HTTP response read from the command line and stdin, report it
/// through the default handlers and print the support report as JSON
pub fn run() -> eyre::Result<()> {
    let settings = SdkSettings::from_env().wrap_err("Failed to load SDK settings")?;
    sdk::start(&settings, SdkHooks::default())?;

    let mut args = std::env::args().skip(1);
    let status: u16 = args
        .next()
        .ok_or_else(|| eyre!(USAGE))?
        .parse()
        .wrap_err("Status must be an HTTP status code")?;
    let url = args.next().unwrap_or_else(|| "unknown".to_string());
    let method = args.next().unwrap_or_else(|| "GET".to_string());

    let mut body = Vec::new();
    std::io::stdin()
        .read_to_end(&mut body)
        .wrap_err("Failed to read response body from stdin")?;

    match classify_http_response(&url, &method, status, &body) {
        None => {
            handlers::dispatch(None, &[]);
            info!(status, "Response is not an error");
        }
        Some(error) => {
            let error = handlers::report(error, &[]);
            println!("{}", ErrorReport::new(&error).to_json_pretty()?);
        }
    }
    Ok(())
}
