use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::fx_errors::FxError;
use super::fx_model::ExchangeRate;
use super::fx_traits::RateProvider;

/// Rate table over externally supplied [`ExchangeRate`] records.
///
/// Rates are stored as independent per-pair time series; inverses are
/// derived on insert. A request for a pair with no direct series is
/// resolved by breadth-first search across the currency graph, using the
/// nearest dated rate on each hop. An unreachable pair is
/// [`FxError::MissingExchangeRate`].
pub struct CurrencyConverter {
    /// Currency -> currencies a direct series exists for.
    neighbors: HashMap<String, HashSet<String>>,

    /// (from, to) -> date-ordered rate series.
    series: HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>,
}

impl CurrencyConverter {
    pub fn new(rates: Vec<ExchangeRate>) -> Self {
        let mut converter = CurrencyConverter {
            neighbors: HashMap::new(),
            series: HashMap::new(),
        };
        converter.add_rates(rates);
        converter
    }

    /// Inserts rates, skipping identity pairs and deriving inverses.
    pub fn add_rates(&mut self, rates: Vec<ExchangeRate>) {
        for rate in rates {
            if rate.from_currency == rate.to_currency || rate.rate.is_zero() {
                continue;
            }
            let date = rate.timestamp.date_naive();
            self.insert(&rate.from_currency, &rate.to_currency, date, rate.rate);
            self.insert(
                &rate.to_currency,
                &rate.from_currency,
                date,
                Decimal::ONE / rate.rate,
            );
        }
    }

    fn insert(&mut self, from: &str, to: &str, date: NaiveDate, rate: Decimal) {
        self.series
            .entry((from.to_string(), to.to_string()))
            .or_default()
            .insert(date, rate);
        self.neighbors
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// Rate of the series entry nearest to `date`, in either direction.
    /// A tie goes to the earlier entry; a single dated rate serves any date.
    fn nearest_rate(&self, from: &str, to: &str, date: NaiveDate) -> Option<Decimal> {
        let series = self.series.get(&(from.to_string(), to.to_string()))?;
        let before = series.range(..=date).next_back();
        let after = series.range(date..).next();

        match (before, after) {
            (Some((d_before, r_before)), Some((d_after, r_after))) => {
                if (date - *d_before).num_days() <= (*d_after - date).num_days() {
                    Some(*r_before)
                } else {
                    Some(*r_after)
                }
            }
            (Some((_, rate)), None) | (None, Some((_, rate))) => Some(*rate),
            (None, None) => None,
        }
    }
}

impl RateProvider for CurrencyConverter {
    fn get_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        // BFS over the currency graph; each hop uses the nearest dated
        // rate, so the shortest available path wins.
        let mut queue: VecDeque<(String, Decimal)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        queue.push_back((from.to_string(), Decimal::ONE));
        visited.insert(from.to_string());

        while let Some((currency, accumulated)) = queue.pop_front() {
            if currency == to {
                return Ok(accumulated);
            }
            let Some(nexts) = self.neighbors.get(&currency) else {
                continue;
            };
            for next in nexts {
                if visited.contains(next) {
                    continue;
                }
                if let Some(rate) = self.nearest_rate(&currency, next, date) {
                    visited.insert(next.clone());
                    queue.push_back((next.clone(), accumulated * rate));
                }
            }
        }

        Err(FxError::MissingExchangeRate {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
