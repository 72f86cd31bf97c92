//! Event handler that forwards projection results to the notifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use log::warn;

use super::notification_traits::Notifier;
use crate::constants::{DEFAULT_NOTIFY_TIMEOUT_SECS, DISPLAY_DECIMAL_PRECISION};
use crate::errors::Result;
use crate::events::{DomainEvent, EventEnvelope, EventHandler};
use crate::ids::PortfolioId;
use crate::valuation::ValuationServiceTrait;

/// Bridges valuation changes and price observations to the external
/// notification channel.
///
/// Keeps its own per-portfolio watermark so redelivered envelopes don't
/// produce duplicate notifications, and bounds every outbound call with a
/// timeout. A slow or failing channel is logged and otherwise ignored.
pub struct NotificationBridge {
    valuations: Arc<dyn ValuationServiceTrait>,
    notifier: Arc<dyn Notifier>,
    watermarks: DashMap<PortfolioId, u64>,
    notify_timeout: Duration,
}

impl NotificationBridge {
    pub fn new(valuations: Arc<dyn ValuationServiceTrait>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            valuations,
            notifier,
            watermarks: DashMap::new(),
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    /// Advances the watermark; false means the envelope was already seen.
    fn advance_watermark(&self, envelope: &EventEnvelope) -> bool {
        let mut watermark = self.watermarks.entry(envelope.portfolio_id).or_insert(0);
        if envelope.sequence <= *watermark {
            return false;
        }
        *watermark = envelope.sequence;
        true
    }

    async fn send_portfolio_summary(&self, portfolio_id: PortfolioId) {
        let Some(valuation) = self.valuations.latest_valuation(portfolio_id) else {
            return;
        };
        let message = format!(
            "Portfolio value: {:.2} {}",
            valuation.total_value.round_dp(DISPLAY_DECIMAL_PRECISION),
            valuation.currency
        );
        let delivery = self
            .notifier
            .notify_portfolio_update(portfolio_id, &message);
        if tokio::time::timeout(self.notify_timeout, delivery).await.is_err() {
            warn!(
                "Portfolio update notification timed out for portfolio {}",
                portfolio_id
            );
        }
    }
}

#[async_trait]
impl EventHandler for NotificationBridge {
    fn name(&self) -> &'static str {
        "notification-bridge"
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        if !self.advance_watermark(envelope) {
            return Ok(());
        }

        match &envelope.event {
            DomainEvent::PriceObserved { symbol, price, .. } => {
                let delivery = self.notifier.notify_price_update(symbol, price);
                if tokio::time::timeout(self.notify_timeout, delivery).await.is_err() {
                    warn!("Price update notification timed out for {}", symbol);
                }
                self.send_portfolio_summary(envelope.portfolio_id).await;
            }

            DomainEvent::InvestmentAdded { .. }
            | DomainEvent::SharesBought { .. }
            | DomainEvent::SharesSold { .. }
            | DomainEvent::InvestmentRemoved { .. } => {
                self.send_portfolio_summary(envelope.portfolio_id).await;
            }

            // Income doesn't change valuations, and a deleted portfolio has
            // nothing left to announce.
            DomainEvent::IncomeRecorded { .. } => {}
            DomainEvent::PortfolioDeleted { .. } => {
                self.watermarks.remove(&envelope.portfolio_id);
            }
        }

        Ok(())
    }
}
