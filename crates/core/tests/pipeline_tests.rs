//! End-to-end test of the event pipeline: append to the log, publish
//! through the dispatcher, and observe both projections and the
//! notification bridge reacting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal_macros::dec;

use foliotrack_core::events::{
    DomainEvent, EventDispatcher, EventEnvelope, EventKind, EventStore, InMemoryEventStore,
    IncomeKind,
};
use foliotrack_core::fx::CurrencyConverter;
use foliotrack_core::income::{DateRange, IncomeService, IncomeServiceTrait};
use foliotrack_core::notifications::{MockNotifier, NotificationBridge};
use foliotrack_core::valuation::{
    PriceCache, ValuationConfig, ValuationService, ValuationServiceTrait,
};
use foliotrack_core::{InvestmentId, Money, Portfolio, PortfolioId, Symbol};
use foliotrack_market_data::{MarketDataError, MarketDataProvider, PricePoint, Quote};

/// Provider that never has data; the pipeline must degrade gracefully.
struct OfflineProvider;

#[async_trait]
impl MarketDataProvider for OfflineProvider {
    fn id(&self) -> &'static str {
        "OFFLINE"
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        Err(MarketDataError::SymbolNotFound(symbol.to_string()))
    }

    async fn get_historical_quotes(
        &self,
        _symbol: &Symbol,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        Err(MarketDataError::NoDataForRange)
    }
}

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, "USD").unwrap()
}

#[tokio::test]
async fn test_full_pipeline_from_append_to_notification() {
    let store = Arc::new(InMemoryEventStore::new());
    let rates = Arc::new(CurrencyConverter::new(vec![]));
    let valuation = Arc::new(ValuationService::new(
        Arc::new(OfflineProvider),
        rates.clone(),
        Arc::new(PriceCache::new()),
        ValuationConfig {
            base_currency: "USD".to_string(),
            price_max_age: Duration::from_secs(900),
            lookup_timeout: Duration::from_millis(50),
        },
    ));
    let notifier = MockNotifier::new();
    let bridge = Arc::new(NotificationBridge::new(
        valuation.clone(),
        Arc::new(notifier.clone()),
    ));
    let income = IncomeService::new(store.clone(), rates);

    // Dispatcher table built explicitly at startup.
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe_all(valuation.clone());
    for kind in [
        EventKind::InvestmentAdded,
        EventKind::SharesBought,
        EventKind::SharesSold,
        EventKind::InvestmentRemoved,
        EventKind::PriceObserved,
        EventKind::PortfolioDeleted,
    ] {
        dispatcher.subscribe(kind, bridge.clone());
    }

    let pid = PortfolioId::new();
    let iid = InvestmentId::new();
    let envelopes = vec![
        EventEnvelope::new(
            pid,
            1,
            Utc::now(),
            DomainEvent::investment_added(
                iid,
                Symbol::new("AAPL"),
                dec!(10),
                usd(dec!(150)),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ),
        ),
        EventEnvelope::new(
            pid,
            2,
            Utc::now(),
            DomainEvent::price_observed(Symbol::new("AAPL"), usd(dec!(160)), Utc::now(), "TEST"),
        ),
        EventEnvelope::new(
            pid,
            3,
            Utc::now(),
            DomainEvent::income_recorded(
                Symbol::new("AAPL"),
                IncomeKind::Dividend,
                usd(dec!(5)),
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            ),
        ),
    ];

    // Durably append, then dispatch, in log order.
    for envelope in envelopes {
        store.append(envelope.clone()).await.unwrap();
        let report = dispatcher.publish(&envelope).await;
        assert!(report.is_clean(), "failures: {:?}", report.failures);
    }

    // Aggregate rebuilt from the log matches the lived-through state.
    let events = store.load_from(pid, 0).unwrap();
    let portfolio = Portfolio::load(pid, &events).unwrap();
    assert_eq!(portfolio.watermark(), 3);
    assert_eq!(portfolio.holding(iid).unwrap().market_value(), usd(dec!(1600)));

    // Valuation projection converged on the observed price.
    let valuation_result = valuation.latest_valuation(pid).unwrap();
    assert_eq!(valuation_result.total_value, dec!(1600));
    assert_eq!(valuation_result.last_sequence, 2);

    // Income projection folds the persisted log independently.
    let report = income.income_report(pid, DateRange::all()).unwrap();
    assert_eq!(report.summary("USD").unwrap().total_income(), dec!(5));

    // The bridge forwarded a price update and portfolio summaries.
    assert_eq!(notifier.price_updates().len(), 1);
    let updates = notifier.portfolio_updates();
    assert!(!updates.is_empty());
    assert_eq!(updates.last().unwrap().1, "Portfolio value: 1600.00 USD");
}
