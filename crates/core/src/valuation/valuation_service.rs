//! Valuation projection service.
//!
//! Subscribes to the event stream, mirrors each portfolio's positions, and
//! recomputes market values from the shared price cache, consulting the
//! market-data contract only for missing or stale prices. External calls
//! are timeout-bounded and cancellable, and no map lock is held across an
//! await: positions are snapshotted first, and the result is written back
//! with an optimistic re-check.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use log::{debug, warn};
use num_traits::Zero;
use rust_decimal::Decimal;

use super::price_cache::{CachedPrice, PriceCache};
use super::valuation_model::{
    HoldingValuation, PortfolioValuation, RefreshOutcome, ValuationWarning,
};
use crate::constants::{
    DECIMAL_PRECISION, DEFAULT_BASE_CURRENCY, DEFAULT_LOOKUP_TIMEOUT_SECS,
    DEFAULT_PRICE_MAX_AGE_SECS,
};
use crate::errors::Result;
use crate::events::{DomainEvent, EventEnvelope, EventHandler};
use crate::fx::RateProvider;
use crate::ids::{InvestmentId, PortfolioId};
use crate::money::Money;
use crate::utils::CancellationToken;
use foliotrack_market_data::{MarketDataError, MarketDataProvider, Quote, Symbol};

/// Tuning knobs for the projection, passed explicitly at construction.
#[derive(Clone, Debug)]
pub struct ValuationConfig {
    /// Reporting currency used by [`ValuationServiceTrait::refresh`].
    pub base_currency: String,

    /// Cached prices older than this trigger a provider lookup.
    pub price_max_age: Duration,

    /// Upper bound on one market data call.
    pub lookup_timeout: Duration,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            price_max_age: Duration::from_secs(DEFAULT_PRICE_MAX_AGE_SECS),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

/// Projection-side mirror of one position.
#[derive(Debug, Clone)]
struct PositionEntry {
    symbol: Symbol,
    quantity: Decimal,
    unit_cost: Money,
}

/// Positions view for one portfolio, advanced by the handler.
#[derive(Debug, Clone, Default)]
struct PositionsView {
    holdings: HashMap<InvestmentId, PositionEntry>,
    last_sequence: u64,
}

/// What the handler must do after folding an envelope into the view.
enum Action {
    Nothing,
    RefreshPortfolio,
    RefreshSymbol(Symbol),
}

enum Computed {
    Value(PortfolioValuation),
    Cancelled,
}

#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Last stored valuation for the portfolio, if any.
    fn latest_valuation(&self, portfolio_id: PortfolioId) -> Option<PortfolioValuation>;

    /// Recomputes the valuation in the configured base currency.
    async fn refresh(
        &self,
        portfolio_id: PortfolioId,
        cancel: CancellationToken,
    ) -> Result<RefreshOutcome>;

    /// Recomputes the valuation in an explicitly requested currency.
    async fn refresh_in(
        &self,
        portfolio_id: PortfolioId,
        currency: &str,
        cancel: CancellationToken,
    ) -> Result<RefreshOutcome>;
}

pub struct ValuationService {
    market_data: Arc<dyn MarketDataProvider>,
    rates: Arc<dyn RateProvider>,
    price_cache: Arc<PriceCache>,
    positions: DashMap<PortfolioId, PositionsView>,
    symbol_index: DashMap<Symbol, HashSet<PortfolioId>>,
    valuations: DashMap<PortfolioId, PortfolioValuation>,
    config: ValuationConfig,
}

impl ValuationService {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        rates: Arc<dyn RateProvider>,
        price_cache: Arc<PriceCache>,
        config: ValuationConfig,
    ) -> Self {
        Self {
            market_data,
            rates,
            price_cache,
            positions: DashMap::new(),
            symbol_index: DashMap::new(),
            valuations: DashMap::new(),
            config,
        }
    }

    /// Folds the envelope into the positions view. Purely synchronous; all
    /// awaiting happens after every map guard is released.
    fn apply_to_view(&self, envelope: &EventEnvelope) -> Action {
        let portfolio_id = envelope.portfolio_id;
        let mut view = self.positions.entry(portfolio_id).or_default();

        // Watermark check: at-least-once delivery must not double-apply.
        if envelope.sequence <= view.last_sequence {
            debug!(
                "Valuation projection already past portfolio {} seq {} (watermark {}), skipping",
                portfolio_id, envelope.sequence, view.last_sequence
            );
            return Action::Nothing;
        }
        view.last_sequence = envelope.sequence;

        match &envelope.event {
            DomainEvent::InvestmentAdded {
                investment_id,
                symbol,
                quantity,
                purchase_price,
                ..
            } => {
                view.holdings.insert(
                    *investment_id,
                    PositionEntry {
                        symbol: symbol.clone(),
                        quantity: *quantity,
                        unit_cost: purchase_price.clone(),
                    },
                );
                let symbol = symbol.clone();
                drop(view);
                self.symbol_index
                    .entry(symbol)
                    .or_default()
                    .insert(portfolio_id);
                Action::RefreshPortfolio
            }

            DomainEvent::SharesBought {
                investment_id,
                quantity,
                price,
                ..
            } => {
                if let Some(entry) = view.holdings.get_mut(investment_id) {
                    let total_quantity = entry.quantity + *quantity;
                    let total_cost =
                        entry.unit_cost.amount() * entry.quantity + price.amount() * *quantity;
                    if !total_quantity.is_zero() {
                        entry.unit_cost = entry.unit_cost.with_amount(total_cost / total_quantity);
                    }
                    entry.quantity = total_quantity;
                }
                Action::RefreshPortfolio
            }

            DomainEvent::SharesSold {
                investment_id,
                quantity,
                ..
            } => {
                if let Some(entry) = view.holdings.get_mut(investment_id) {
                    // The aggregate already rejected oversells; saturate
                    // rather than go negative on a filtered stream.
                    entry.quantity = (entry.quantity - *quantity).max(Decimal::ZERO);
                }
                Action::RefreshPortfolio
            }

            DomainEvent::InvestmentRemoved { investment_id, .. } => {
                let removed = view.holdings.remove(investment_id);
                let symbol_still_held = removed.as_ref().map(|entry| {
                    view.holdings
                        .values()
                        .any(|other| other.symbol == entry.symbol)
                });
                drop(view);
                if let (Some(entry), Some(false)) = (removed, symbol_still_held) {
                    if let Some(mut portfolios) = self.symbol_index.get_mut(&entry.symbol) {
                        portfolios.remove(&portfolio_id);
                    }
                }
                Action::RefreshPortfolio
            }

            DomainEvent::PriceObserved {
                symbol,
                price,
                observed_at,
                source,
            } => {
                drop(view);
                let accepted = self.price_cache.observe(
                    symbol.clone(),
                    CachedPrice {
                        price: price.clone(),
                        observed_at: *observed_at,
                        source: source.clone(),
                    },
                );
                if accepted {
                    Action::RefreshSymbol(symbol.clone())
                } else {
                    // Older than the cached observation: discarded.
                    debug!("Discarded stale price observation for {}", symbol);
                    Action::Nothing
                }
            }

            // Income does not affect market value.
            DomainEvent::IncomeRecorded { .. } => Action::Nothing,

            DomainEvent::PortfolioDeleted { .. } => {
                drop(view);
                self.tombstone(portfolio_id);
                Action::Nothing
            }
        }
    }

    /// Drops every piece of derived state for a deleted portfolio.
    fn tombstone(&self, portfolio_id: PortfolioId) {
        self.positions.remove(&portfolio_id);
        self.valuations.remove(&portfolio_id);
        self.symbol_index.retain(|_, portfolios| {
            portfolios.remove(&portfolio_id);
            !portfolios.is_empty()
        });
    }

    /// Price for one symbol: fresh cache entry, else provider, else the
    /// best fallback available. Never fails; problems become warnings.
    async fn resolve_price(
        &self,
        symbol: &Symbol,
        unit_cost: &Money,
        now: DateTime<Utc>,
        warnings: &mut Vec<ValuationWarning>,
        cancel: &mut CancellationToken,
    ) -> Option<(Money, Option<DateTime<Utc>>)> {
        let cached = self.price_cache.get(symbol);
        if let Some(cached) = &cached {
            if self.price_cache.is_fresh(symbol, self.config.price_max_age, now) {
                return Some((cached.price.clone(), Some(cached.observed_at)));
            }
        }

        match self.fetch_quote(symbol, cancel).await {
            Ok(quote) => match Money::new(quote.price, &quote.currency) {
                Ok(price) => {
                    self.price_cache.observe(
                        symbol.clone(),
                        CachedPrice {
                            price: price.clone(),
                            observed_at: quote.timestamp,
                            source: quote.source,
                        },
                    );
                    // The cache may hold something even newer; use whatever
                    // won.
                    let current = self.price_cache.get(symbol);
                    match current {
                        Some(current) => Some((current.price, Some(current.observed_at))),
                        None => Some((price, Some(quote.timestamp))),
                    }
                }
                Err(e) => {
                    warn!("Provider quote for {} unusable: {}", symbol, e);
                    warnings.push(ValuationWarning::PriceLookupFailed {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    });
                    Some((unit_cost.clone(), None))
                }
            },
            Err(MarketDataError::Cancelled) => None,
            Err(e) => {
                warn!("Price lookup failed for {}: {}", symbol, e);
                match cached {
                    Some(cached) => {
                        warnings.push(ValuationWarning::StalePrice {
                            symbol: symbol.clone(),
                            observed_at: cached.observed_at,
                        });
                        Some((cached.price, Some(cached.observed_at)))
                    }
                    None => {
                        warnings.push(ValuationWarning::PriceLookupFailed {
                            symbol: symbol.clone(),
                            reason: e.to_string(),
                        });
                        Some((unit_cost.clone(), None))
                    }
                }
            }
        }
    }

    /// One provider call, bounded by the configured timeout and the
    /// caller's cancellation token.
    async fn fetch_quote(
        &self,
        symbol: &Symbol,
        cancel: &mut CancellationToken,
    ) -> std::result::Result<Quote, MarketDataError> {
        let lookup = tokio::time::timeout(
            self.config.lookup_timeout,
            self.market_data.get_latest_quote(symbol),
        );
        tokio::select! {
            _ = cancel.cancelled() => Err(MarketDataError::Cancelled),
            outcome = lookup => match outcome {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::Timeout {
                    provider: self.market_data.id().to_string(),
                }),
            },
        }
    }

    async fn compute(
        &self,
        portfolio_id: PortfolioId,
        view: &PositionsView,
        currency: &str,
        cancel: &mut CancellationToken,
    ) -> Result<Computed> {
        // Validates the requested currency code up front.
        let zero = Money::zero(currency).map_err(crate::errors::Error::Money)?;
        let currency = zero.currency().to_string();

        let calculated_at = Utc::now();
        let mut warnings = Vec::new();
        let mut holdings = Vec::new();
        let mut total = Decimal::zero();

        for (investment_id, entry) in &view.holdings {
            if cancel.is_cancelled() {
                return Ok(Computed::Cancelled);
            }

            let Some((price, priced_at)) = self
                .resolve_price(&entry.symbol, &entry.unit_cost, calculated_at, &mut warnings, cancel)
                .await
            else {
                return Ok(Computed::Cancelled);
            };

            let market_value = price.scale(entry.quantity);
            let converted_value = if price.currency() == currency {
                Some(market_value.amount())
            } else {
                match self.rates.get_rate(
                    price.currency(),
                    &currency,
                    calculated_at.date_naive(),
                ) {
                    Ok(rate) => Some(market_value.amount() * rate),
                    Err(e) => {
                        warn!(
                            "No exchange rate for portfolio {} holding {}: {}",
                            portfolio_id, entry.symbol, e
                        );
                        warnings.push(ValuationWarning::MissingExchangeRate {
                            from: price.currency().to_string(),
                            to: currency.clone(),
                        });
                        None
                    }
                }
            };

            if let Some(value) = converted_value {
                total += value;
            }

            holdings.push(HoldingValuation {
                investment_id: *investment_id,
                symbol: entry.symbol.clone(),
                quantity: entry.quantity,
                price,
                market_value,
                converted_value,
                priced_at,
            });
        }

        // HashMap iteration order is arbitrary; keep the output stable.
        holdings.sort_by(|a, b| {
            (a.symbol.to_string(), a.investment_id.to_string())
                .cmp(&(b.symbol.to_string(), b.investment_id.to_string()))
        });

        Ok(Computed::Value(PortfolioValuation {
            portfolio_id,
            currency,
            total_value: total.round_dp(DECIMAL_PRECISION),
            holdings,
            warnings,
            last_sequence: view.last_sequence,
            calculated_at,
        }))
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    fn latest_valuation(&self, portfolio_id: PortfolioId) -> Option<PortfolioValuation> {
        self.valuations.get(&portfolio_id).map(|v| v.clone())
    }

    async fn refresh(
        &self,
        portfolio_id: PortfolioId,
        cancel: CancellationToken,
    ) -> Result<RefreshOutcome> {
        let base_currency = self.config.base_currency.clone();
        self.refresh_in(portfolio_id, &base_currency, cancel).await
    }

    async fn refresh_in(
        &self,
        portfolio_id: PortfolioId,
        currency: &str,
        cancel: CancellationToken,
    ) -> Result<RefreshOutcome> {
        let mut cancel = cancel;
        let mut attempts = 0;
        loop {
            // Snapshot, then release the guard before any await.
            let snapshot = self
                .positions
                .get(&portfolio_id)
                .map(|view| view.clone())
                .unwrap_or_default();
            let snapshot_sequence = snapshot.last_sequence;

            let valuation = match self
                .compute(portfolio_id, &snapshot, currency, &mut cancel)
                .await?
            {
                Computed::Value(valuation) => valuation,
                Computed::Cancelled => return Ok(RefreshOutcome::Cancelled),
            };

            let current_sequence = self
                .positions
                .get(&portfolio_id)
                .map(|view| view.last_sequence)
                .unwrap_or(0);
            attempts += 1;

            // Optimistic concurrency: one recompute on conflict, then
            // accept the (momentarily stale) result.
            if current_sequence != snapshot_sequence && attempts < 2 {
                debug!(
                    "Portfolio {} advanced during valuation ({} -> {}), recomputing once",
                    portfolio_id, snapshot_sequence, current_sequence
                );
                continue;
            }

            self.valuations.insert(portfolio_id, valuation.clone());
            return Ok(RefreshOutcome::Updated(valuation));
        }
    }
}

#[async_trait]
impl EventHandler for ValuationService {
    fn name(&self) -> &'static str {
        "valuation"
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        match self.apply_to_view(envelope) {
            Action::Nothing => Ok(()),

            Action::RefreshPortfolio => {
                self.refresh(envelope.portfolio_id, CancellationToken::none())
                    .await?;
                Ok(())
            }

            Action::RefreshSymbol(symbol) => {
                let affected: Vec<PortfolioId> = self
                    .symbol_index
                    .get(&symbol)
                    .map(|portfolios| portfolios.iter().copied().collect())
                    .unwrap_or_default();

                let refreshes = affected
                    .into_iter()
                    .map(|portfolio_id| self.refresh(portfolio_id, CancellationToken::none()));
                for outcome in join_all(refreshes).await {
                    outcome?;
                }
                Ok(())
            }
        }
    }
}
