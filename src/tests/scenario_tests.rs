//! End-to-end flows through construction, normalization and the handler chain

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use crate::config::SdkSettings;
    use crate::error::analytics::{AnalyticsEvent, MessageType};
    use crate::error::bridge::{ThreeDsError, ThreeDsErrorInfo, ThreeDsErrorKind};
    use crate::error::network::NetworkError;
    use crate::error::normalize::{classify_http_response, normalize};
    use crate::error::taxonomy::payment_method;
    use crate::error::validation::{InputElement, ValidationError};
    use crate::error::{ErrorKind, ErrorSeverity, PaymentError};
    use crate::handlers::{
        AnalyticsSink, CheckoutDelegate, HandlerError, HandlerRegistry, ResultPresenter,
    };
    use crate::sdk::{SdkHooks, register_defaults};

    #[derive(Default)]
    struct Recorded {
        events: Mutex<Vec<AnalyticsEvent>>,
        screens: Mutex<Vec<String>>,
        delegate_calls: Mutex<Vec<String>>,
    }

    impl AnalyticsSink for Recorded {
        fn record(&self, event: AnalyticsEvent) -> Result<(), HandlerError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    impl ResultPresenter for Recorded {
        fn show_success(&self) {
            self.screens.lock().unwrap().push("success".into());
        }

        fn show_failure(&self, error: &PaymentError) {
            self.screens
                .lock()
                .unwrap()
                .push(format!("failure:{}", error.error_id()));
        }

        fn dismiss(&self) {
            self.screens.lock().unwrap().push("dismiss".into());
        }
    }

    impl CheckoutDelegate for Recorded {
        fn on_resume_error(&self, error: &PaymentError) {
            self.delegate_calls.lock().unwrap().push(error.error_id());
        }
    }

    fn wired_registry(settings: &SdkSettings) -> (HandlerRegistry, Arc<Recorded>) {
        let recorded = Arc::new(Recorded::default());
        let registry = HandlerRegistry::new();
        register_defaults(
            &registry,
            settings,
            SdkHooks {
                delegate: Some(recorded.clone()),
                presenter: Some(recorded.clone()),
                analytics: Some(recorded.clone()),
            },
        );
        (registry, recorded)
    }

    #[test]
    fn test_rejected_cvv() {
        let error: PaymentError = ValidationError::invalid_cvv("CVV must be 3 or 4 digits").into();

        assert_eq!(error.error_id(), "invalid-cvv");
        assert_eq!(error.recovery_suggestion(), None);
        assert_eq!(
            error.as_validation().map(|v| v.element()),
            Some(InputElement::Cvv)
        );
        assert_eq!(error.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_server_error_preserves_server_diagnostics_id() {
        let body = br#"{"errorId":"server-down","description":"Service unavailable","diagnosticsId":"d-1","validationErrors":null}"#;
        let error = classify_http_response("https://api/payments", "POST", 503, body).unwrap();
        let error = normalize(error);

        assert_eq!(error.error_id(), "server-error");
        assert_eq!(error.diagnostics_id(), "d-1");
        assert!(error.is_retryable());
        match error.kind() {
            ErrorKind::Network(NetworkError::ServerError { status, response }) => {
                assert_eq!(*status, 503);
                assert_eq!(response.as_ref().unwrap().error_id, "server-down");
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_three_ds_native_failure_context() {
        let native = ThreeDsError::new(ThreeDsErrorKind::SdkFailure(ThreeDsErrorInfo {
            error_id: "3ds-protocol-error".into(),
            description: "ACS rejected the challenge".into(),
            code: Some(14),
            component: Some("ACS".into()),
            ..Default::default()
        }));
        let error = normalize(PaymentError::three_ds_should_break(PaymentError::three_ds(
            native, None,
        )));
        let context = error.analytics_context();

        assert_eq!(context.get("threeDsErrorCode"), Some(&Value::from(14)));
        assert_eq!(context.get("threeDsErrorComponent"), Some(&Value::from("ACS")));
        assert_eq!(context, error.analytics_context());
    }

    #[test]
    fn test_form_submission_keeps_every_validation_error() {
        let messages = [
            "CVV must be 3 or 4 digits",
            "Card has expired",
            "Cardholder name is required",
        ];
        let aggregate = PaymentError::underlying_errors(vec![
            ValidationError::invalid_cvv(messages[0]).into(),
            ValidationError::invalid_expiry_date(messages[1]).into(),
            ValidationError::invalid_cardholder_name(messages[2]).into(),
        ]);

        let error = normalize(aggregate);
        let description = error.description();

        assert_eq!(error.error_id(), "generic-underlying-errors");
        assert!(matches!(error.kind(), ErrorKind::Aggregate(members) if members.len() == 3));
        for message in messages {
            assert!(description.contains(message), "{description}");
        }
        assert!(description.contains(" | "));
    }

    #[test]
    fn test_apple_pay_cancellation_dismisses_and_records_event() {
        let (registry, recorded) = wired_registry(&SdkSettings::default());

        let error = registry.report(PaymentError::cancelled(payment_method::APPLE_PAY), &[]);

        assert_eq!(error.error_id(), "payment-cancelled");
        assert_eq!(*recorded.screens.lock().unwrap(), vec!["dismiss"]);
        assert_eq!(*recorded.delegate_calls.lock().unwrap(), vec!["payment-cancelled"]);

        let events = recorded.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message_type, MessageType::PaymentCancelled);
        assert_eq!(events[0].payment_method_type(), Some("APPLE_PAY"));
    }

    #[test]
    fn test_success_shows_success_screen_only() {
        let (registry, recorded) = wired_registry(&SdkSettings::default());

        let summary = registry.dispatch(None, &[]);

        assert_eq!(summary.delivered, 4);
        assert_eq!(*recorded.screens.lock().unwrap(), vec!["success"]);
        assert!(recorded.events.lock().unwrap().is_empty());
        assert!(recorded.delegate_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_analytics_can_be_disabled() {
        let settings = SdkSettings {
            analytics_enabled: false,
            ..SdkSettings::default()
        };
        let (registry, recorded) = wired_registry(&settings);

        registry.report(PaymentError::invalid_client_token(), &[]);

        assert_eq!(registry.handler_names(), vec!["logging", "delegate", "ui-trigger"]);
        assert!(recorded.events.lock().unwrap().is_empty());
        assert_eq!(
            *recorded.screens.lock().unwrap(),
            vec!["failure:invalid-client-token"]
        );
    }
}
