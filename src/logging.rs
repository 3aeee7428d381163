//! Tracing setup and structured error records

use tracing::Span;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::config::SdkSettings;
use crate::error::{ErrorSeverity, InfoMap, PaymentError};

const FALLBACK_FILTER: &str = "info";

/// Install the global subscriber. Returns `false` when one is already set.
///
/// An unparsable `log_filter` falls back to `info` and is reported through
/// the installed subscriber.
pub fn init_tracing(settings: &SdkSettings) -> bool {
    let (filter, invalid) = build_filter(&settings.log_filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_line_number(settings.log_source_location)
                .with_file(settings.log_source_location),
        )
        .try_init()
        .is_ok();

    if let Some(e) = invalid {
        tracing::warn!(
            directive = %settings.log_filter,
            fallback = FALLBACK_FILTER,
            "Invalid log filter: {e}"
        );
    }
    installed
}

fn build_filter(directive: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(FALLBACK_FILTER), Some(e)),
    }
}

/// Span carrying the support identifiers of one error
pub fn error_span(error: &PaymentError) -> Span {
    let class = error.class();
    tracing::error_span!(
        "payment_error",
        error_id = %error.error_id(),
        diagnostics_id = %error.diagnostics_id(),
        class = ?class,
        retryable = error.is_retryable(),
        payment_method_type = error.payment_method_type().unwrap_or("none"),
    )
}

/// Error metadata plus the analytics context (3DS SDK details and the like)
pub fn log_fields(error: &PaymentError) -> InfoMap {
    let mut fields = error.info();
    for (key, value) in error.analytics_context() {
        fields.entry(key).or_insert(value);
    }
    fields
}

/// Log an error at the level matching its severity
pub fn log_error(error: &PaymentError) {
    let span = error_span(error);
    let _guard = span.enter();
    let description = error.description();
    let info = serde_json::Value::Object(log_fields(error));
    match error.severity() {
        ErrorSeverity::Error => tracing::error!(%info, "{description}"),
        ErrorSeverity::Warning => tracing::warn!(%info, "{description}"),
        ErrorSeverity::Info => tracing::info!(%info, "{description}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::bridge::{ThreeDsError, ThreeDsErrorInfo, ThreeDsErrorKind};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn acs_failure() -> PaymentError {
        let native = ThreeDsError::new(ThreeDsErrorKind::SdkFailure(ThreeDsErrorInfo {
            error_id: "3ds-protocol-error".into(),
            description: "ACS rejected the challenge".into(),
            code: Some(14),
            component: Some("ACS".into()),
            transaction_id: Some("tx-9".into()),
            ..Default::default()
        }))
        .with_sdk("Netcetera", "2.3.1")
        .with_init_protocol_version("2.2.0");
        PaymentError::three_ds(native, None)
    }

    #[test]
    fn test_three_ds_record_carries_sdk_context() {
        let error = acs_failure();
        let output = capture(|| log_error(&error));

        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("threeDsErrorCode"), "{output}");
        assert!(output.contains("tx-9"), "{output}");
        assert!(output.contains("Netcetera"), "{output}");
        assert!(output.contains("2.2.0"), "{output}");
        assert!(output.contains(error.diagnostics_id()), "{output}");
    }

    #[test]
    fn test_log_fields_keep_variant_info_on_key_clash() {
        let error = acs_failure();
        let info = error.info();
        let fields = log_fields(&error);

        for (key, value) in &info {
            assert_eq!(fields.get(key), Some(value));
        }
        for key in error.analytics_context().keys() {
            assert!(fields.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        let (_, invalid) = build_filter("payment_diagnostics_lib=loud");
        assert!(invalid.is_some());

        let (_, invalid) = build_filter("payment_diagnostics_lib=debug,info");
        assert!(invalid.is_none());
    }
}
