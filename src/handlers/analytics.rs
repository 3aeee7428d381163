//! Analytics emission
//!
//! The handler only builds the event and hands it to an [`AnalyticsSink`].
//! [`ChannelAnalyticsSink`] queues events on a tokio channel and
//! [`run_analytics_pump`] drains them into an async transport, so the chain
//! never waits on network I/O.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use super::{ErrorHandler, HandlerError};
use crate::error::PaymentError;
use crate::error::analytics::AnalyticsEvent;

/// Destination for analytics events; must not block
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: AnalyticsEvent) -> Result<(), HandlerError>;
}

/// Backend that delivers events, e.g. over HTTP
#[async_trait]
pub trait AnalyticsTransport: Send + Sync {
    async fn send(&self, event: &AnalyticsEvent) -> Result<(), String>;

    fn name(&self) -> &str;
}

pub struct AnalyticsHandler {
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsHandler {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink }
    }
}

impl ErrorHandler for AnalyticsHandler {
    fn name(&self) -> &str {
        "analytics"
    }

    fn handle(&self, error: Option<&PaymentError>) -> Result<(), HandlerError> {
        match error {
            Some(error) => self.sink.record(AnalyticsEvent::from_error(error)),
            None => Ok(()),
        }
    }
}

/// Fire-and-forget sink backed by an unbounded channel
#[derive(Clone)]
pub struct ChannelAnalyticsSink {
    tx: UnboundedSender<AnalyticsEvent>,
}

impl ChannelAnalyticsSink {
    pub fn new() -> (Self, UnboundedReceiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AnalyticsSink for ChannelAnalyticsSink {
    fn record(&self, event: AnalyticsEvent) -> Result<(), HandlerError> {
        self.tx
            .send(event)
            .map_err(|_| HandlerError::Unavailable("analytics pump has stopped".into()))
    }
}

/// Drain queued events into `transport` until every sender is dropped.
/// Returns the number of events delivered.
pub async fn run_analytics_pump(
    mut rx: UnboundedReceiver<AnalyticsEvent>,
    transport: Arc<dyn AnalyticsTransport>,
) -> usize {
    let mut delivered = 0;
    while let Some(event) = rx.recv().await {
        match transport.send(&event).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(
                transport = transport.name(),
                diagnostics_id = %event.diagnostics_id,
                error = %e,
                "Failed to send analytics event"
            ),
        }
    }
    debug!(delivered, "Analytics pump stopped");
    delivered
}

#[cfg(test)]
mod tests {
    use tokio::sync::Mutex;

    use super::*;
    use crate::error::taxonomy::payment_method;

    #[derive(Default)]
    struct MemoryTransport {
        events: Mutex<Vec<AnalyticsEvent>>,
    }

    #[async_trait]
    impl AnalyticsTransport for MemoryTransport {
        async fn send(&self, event: &AnalyticsEvent) -> Result<(), String> {
            if event.error_id() == Some("unknown") {
                return Err("rejected".into());
            }
            self.events.lock().await.push(event.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    #[tokio::test]
    async fn test_pump_delivers_and_skips_failures() {
        let (sink, rx) = ChannelAnalyticsSink::new();
        let transport = Arc::new(MemoryTransport::default());
        let pump = tokio::spawn(run_analytics_pump(rx, transport.clone()));

        let handler = AnalyticsHandler::new(Arc::new(sink));
        handler
            .handle(Some(&PaymentError::cancelled(payment_method::APPLE_PAY)))
            .unwrap();
        handler.handle(Some(&PaymentError::unknown())).unwrap();
        handler.handle(None).unwrap();
        drop(handler);

        assert_eq!(pump.await.unwrap(), 1);
        let events = transport.events.lock().await;
        assert_eq!(events[0].payment_method_type(), Some("APPLE_PAY"));
    }

    #[test]
    fn test_closed_channel_is_reported() {
        let (sink, rx) = ChannelAnalyticsSink::new();
        drop(rx);

        let handler = AnalyticsHandler::new(Arc::new(sink));
        let result = handler.handle(Some(&PaymentError::unknown()));

        assert!(matches!(result, Err(HandlerError::Unavailable(_))));
    }
}
