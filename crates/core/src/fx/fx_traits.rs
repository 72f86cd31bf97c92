use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::fx_errors::FxError;
use crate::money::Money;

/// Read-side contract for exchange rates.
///
/// The core is conversion-policy-agnostic: where rates come from, how they
/// are interpolated, and whether cross rates are allowed is entirely the
/// provider's business. Identity pairs must always resolve to 1.
pub trait RateProvider: Send + Sync {
    /// Unit rate from `from` to `to` effective on `date`.
    fn get_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Decimal, FxError>;

    /// Converts an amount into `to_currency` at the rate for `date`.
    fn convert(&self, money: &Money, to_currency: &str, date: NaiveDate) -> Result<Money, FxError> {
        if money.currency() == to_currency {
            return Ok(money.clone());
        }
        let rate = self.get_rate(money.currency(), to_currency, date)?;
        Money::new(money.amount() * rate, to_currency)
            .map_err(|e| FxError::InvalidRate(e.to_string()))
    }
}
