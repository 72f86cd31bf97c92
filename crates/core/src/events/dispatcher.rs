//! In-process publish/subscribe dispatch for domain events.
//!
//! The routing table is built explicitly at startup: `subscribe` takes
//! `&mut self`, after which the dispatcher is shared immutably (typically in
//! an `Arc`). Events are already durably appended by the time they are
//! published, so a failing handler never marks the event as failed - the
//! failure is isolated, logged, and reported back to the publisher.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};

use super::domain_event::{EventEnvelope, EventKind};
use crate::errors::Result;

/// A subscriber for domain events.
///
/// Handlers must be idempotent: redelivery of an already-processed envelope
/// (after a retry or restart) must not double-apply effects. Projections
/// achieve this by tracking the last sequence processed per portfolio and
/// skipping envelopes at or below that watermark.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable name used in logs and failure reports.
    fn name(&self) -> &'static str;

    async fn handle(&self, envelope: &EventEnvelope) -> Result<()>;
}

/// One handler's failure during a publish.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    pub handler: &'static str,
    pub kind: EventKind,
    pub sequence: u64,
    pub message: String,
}

/// Outcome of a publish: how many handlers ran, and which ones failed.
///
/// Delivery to the remaining handlers continues past a failure; the caller
/// decides whether to retry or alert based on this report.
#[derive(Debug, Default)]
pub struct PublishReport {
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Routes each published envelope to the handlers registered for its
/// concrete variant, in registration order.
///
/// Ordering across *different* handlers is not a guarantee handlers may rely
/// on; per-portfolio ordering holds because the publisher feeds a
/// portfolio's envelopes in log order and `publish` awaits handlers
/// sequentially.
#[derive(Default)]
pub struct EventDispatcher {
    routes: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one event variant.
    pub fn subscribe(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.routes.entry(kind).or_default().push(handler);
    }

    /// Registers a handler for every event variant.
    pub fn subscribe_all(&mut self, handler: Arc<dyn EventHandler>) {
        for kind in EventKind::ALL {
            self.subscribe(kind, Arc::clone(&handler));
        }
    }

    /// Number of handlers registered for a variant.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.routes.get(&kind).map_or(0, Vec::len)
    }

    /// Delivers the envelope to every handler registered for its variant.
    ///
    /// A handler error is caught and logged with the event's identity, and
    /// delivery continues; `publish` itself never fails.
    pub async fn publish(&self, envelope: &EventEnvelope) -> PublishReport {
        let kind = envelope.kind();
        let mut report = PublishReport::default();

        let Some(handlers) = self.routes.get(&kind) else {
            debug!(
                "No handlers for {:?} (portfolio {}, seq {})",
                kind, envelope.portfolio_id, envelope.sequence
            );
            return report;
        };

        for handler in handlers {
            match handler.handle(envelope).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(
                        "Handler '{}' failed on {:?} (portfolio {}, seq {}): {}",
                        handler.name(),
                        kind,
                        envelope.portfolio_id,
                        envelope.sequence,
                        e
                    );
                    report.failures.push(HandlerFailure {
                        handler: handler.name(),
                        kind,
                        sequence: envelope.sequence,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::ids::PortfolioId;
    use crate::money::Money;
    use chrono::Utc;
    use foliotrack_market_data::Symbol;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    use crate::events::DomainEvent;

    struct Recorder {
        name: &'static str,
        seen: Mutex<Vec<u64>>,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
            if self.fail {
                return Err(Error::Unexpected("boom".to_string()));
            }
            self.seen.lock().unwrap().push(envelope.sequence);
            Ok(())
        }
    }

    fn price_envelope(sequence: u64) -> EventEnvelope {
        EventEnvelope::new(
            PortfolioId::new(),
            sequence,
            Utc::now(),
            DomainEvent::price_observed(
                Symbol::new("AAPL"),
                Money::new(dec!(160), "USD").unwrap(),
                Utc::now(),
                "TEST",
            ),
        )
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let first = Recorder::new("first", false);
        let second = Recorder::new("second", false);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(EventKind::PriceObserved, first.clone());
        dispatcher.subscribe(EventKind::PriceObserved, second.clone());

        let report = dispatcher.publish(&price_envelope(1)).await;
        assert!(report.is_clean());
        assert_eq!(report.delivered, 2);
        assert_eq!(*first.seen.lock().unwrap(), vec![1]);
        assert_eq!(*second.seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_block_others() {
        let broken = Recorder::new("broken", true);
        let healthy = Recorder::new("healthy", false);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(EventKind::PriceObserved, broken);
        dispatcher.subscribe(EventKind::PriceObserved, healthy.clone());

        let report = dispatcher.publish(&price_envelope(7)).await;
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].handler, "broken");
        assert_eq!(report.failures[0].sequence, 7);
        assert_eq!(*healthy.seen.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_clean() {
        let dispatcher = EventDispatcher::new();
        let report = dispatcher.publish(&price_envelope(1)).await;
        assert!(report.is_clean());
        assert_eq!(report.delivered, 0);
    }

    #[tokio::test]
    async fn test_subscribe_all_covers_every_variant() {
        let handler = Recorder::new("all", false);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe_all(handler);

        for kind in EventKind::ALL {
            assert_eq!(dispatcher.handler_count(kind), 1);
        }
    }

    #[tokio::test]
    async fn test_per_portfolio_order_preserved_for_one_handler() {
        let handler = Recorder::new("ordered", false);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(EventKind::PriceObserved, handler.clone());

        for seq in 1..=5 {
            dispatcher.publish(&price_envelope(seq)).await;
        }
        assert_eq!(*handler.seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }
}
