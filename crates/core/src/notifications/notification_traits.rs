//! Notification contract and test implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ids::PortfolioId;
use crate::money::Money;
use foliotrack_market_data::Symbol;

/// External notification channel.
///
/// Fire-and-forget from the core's viewpoint: implementations own their
/// delivery guarantees, and a lost notification must never affect domain
/// state.
///
/// # Design Rules
///
/// - Calls should return quickly; the bridge additionally bounds them with
///   a timeout.
/// - Implementations must tolerate duplicate notifications (the bridge is
///   at-least-once downstream of event redelivery).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_portfolio_update(&self, portfolio_id: PortfolioId, message: &str);

    async fn notify_price_update(&self, symbol: &Symbol, price: &Money);
}

/// No-op implementation for tests or contexts without a channel.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify_portfolio_update(&self, _portfolio_id: PortfolioId, _message: &str) {
        // Intentionally empty - notifications are discarded
    }

    async fn notify_price_update(&self, _symbol: &Symbol, _price: &Money) {
        // Intentionally empty - notifications are discarded
    }
}

/// Mock notifier for testing - collects every call.
#[derive(Clone, Default)]
pub struct MockNotifier {
    portfolio_updates: Arc<Mutex<Vec<(PortfolioId, String)>>>,
    price_updates: Arc<Mutex<Vec<(Symbol, Money)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn portfolio_updates(&self) -> Vec<(PortfolioId, String)> {
        self.portfolio_updates.lock().unwrap().clone()
    }

    pub fn price_updates(&self) -> Vec<(Symbol, Money)> {
        self.price_updates.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio_updates.lock().unwrap().is_empty()
            && self.price_updates.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify_portfolio_update(&self, portfolio_id: PortfolioId, message: &str) {
        self.portfolio_updates
            .lock()
            .unwrap()
            .push((portfolio_id, message.to_string()));
    }

    async fn notify_price_update(&self, symbol: &Symbol, price: &Money) {
        self.price_updates
            .lock()
            .unwrap()
            .push((symbol.clone(), price.clone()));
    }
}
