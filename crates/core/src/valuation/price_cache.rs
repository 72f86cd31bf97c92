//! Shared price cache keyed by symbol.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::money::Money;
use foliotrack_market_data::Symbol;

/// Latest accepted observation for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPrice {
    pub price: Money,
    pub observed_at: DateTime<Utc>,
    pub source: String,
}

/// Read-mostly map of latest prices, shared across portfolios.
///
/// Writes are last-writer-wins keyed by observation timestamp: an older
/// `PriceObserved` arriving after a newer one is discarded. Owned by the
/// valuation projection; created at startup, entries dropped when no
/// portfolio references the symbol anymore.
#[derive(Default)]
pub struct PriceCache {
    entries: DashMap<Symbol, CachedPrice>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<CachedPrice> {
        self.entries.get(symbol).map(|entry| entry.clone())
    }

    /// Offers an observation; returns whether it was accepted.
    pub fn observe(&self, symbol: Symbol, candidate: CachedPrice) -> bool {
        match self.entries.entry(symbol) {
            dashmap::mapref::entry::Entry::Occupied(mut current) => {
                if candidate.observed_at > current.get().observed_at {
                    current.insert(candidate);
                    true
                } else {
                    false
                }
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(candidate);
                true
            }
        }
    }

    /// True when a cached price exists and is younger than `max_age`.
    pub fn is_fresh(&self, symbol: &Symbol, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.entries.get(symbol).is_some_and(|entry| {
            (now - entry.observed_at)
                .to_std()
                .map_or(true, |age| age <= max_age)
        })
    }

    pub fn remove(&self, symbol: &Symbol) {
        self.entries.remove(symbol);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn cached(amount: rust_decimal::Decimal, hour: u32) -> CachedPrice {
        CachedPrice {
            price: Money::new(amount, "USD").unwrap(),
            observed_at: Utc.with_ymd_and_hms(2024, 1, 5, hour, 0, 0).unwrap(),
            source: "TEST".to_string(),
        }
    }

    #[test]
    fn test_newer_observation_replaces_older() {
        let cache = PriceCache::new();
        let symbol = Symbol::new("AAPL");

        assert!(cache.observe(symbol.clone(), cached(dec!(150), 10)));
        assert!(cache.observe(symbol.clone(), cached(dec!(160), 11)));

        let current = cache.get(&symbol).unwrap();
        assert_eq!(current.price.amount(), dec!(160));
    }

    #[test]
    fn test_stale_observation_discarded() {
        let cache = PriceCache::new();
        let symbol = Symbol::new("AAPL");

        assert!(cache.observe(symbol.clone(), cached(dec!(160), 11)));
        assert!(!cache.observe(symbol.clone(), cached(dec!(150), 10)));

        let current = cache.get(&symbol).unwrap();
        assert_eq!(current.price.amount(), dec!(160));
    }

    #[test]
    fn test_equal_timestamp_keeps_first_writer() {
        let cache = PriceCache::new();
        let symbol = Symbol::new("AAPL");

        assert!(cache.observe(symbol.clone(), cached(dec!(150), 10)));
        assert!(!cache.observe(symbol.clone(), cached(dec!(151), 10)));
        assert_eq!(cache.get(&symbol).unwrap().price.amount(), dec!(150));
    }

    #[test]
    fn test_freshness_window() {
        let cache = PriceCache::new();
        let symbol = Symbol::new("AAPL");
        cache.observe(symbol.clone(), cached(dec!(150), 10));

        let shortly_after = Utc.with_ymd_and_hms(2024, 1, 5, 10, 5, 0).unwrap();
        let much_later = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let max_age = Duration::from_secs(900);

        assert!(cache.is_fresh(&symbol, max_age, shortly_after));
        assert!(!cache.is_fresh(&symbol, max_age, much_later));
        assert!(!cache.is_fresh(&Symbol::new("MSFT"), max_age, shortly_after));
    }
}
