//! Money as an amount paired with its currency.
//!
//! Arithmetic across currencies is rejected rather than converted: the core
//! is conversion-policy-agnostic, and anything that needs a cross-currency
//! sum goes through an explicit [`crate::fx::RateProvider`].

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),
}

/// An amount of a single currency.
///
/// The currency code is normalized (trimmed, uppercased) and must be a
/// three-letter ISO-4217-style code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl AsRef<str>) -> Result<Self, MoneyError> {
        let code = currency.as_ref().trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(currency.as_ref().to_string()));
        }
        Ok(Self {
            amount,
            currency: code,
        })
    }

    pub fn zero(currency: impl AsRef<str>) -> Result<Self, MoneyError> {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Same-currency addition. Differing currencies are a [`MoneyError`],
    /// never an implicit conversion.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Same-currency subtraction.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Scaling by a dimensionless factor (quantity, rate) keeps the currency.
    pub fn scale(&self, factor: Decimal) -> Money {
        Money {
            amount: self.amount * factor,
            currency: self.currency.clone(),
        }
    }

    /// Replaces the amount, keeping the currency.
    pub fn with_amount(&self, amount: Decimal) -> Money {
        Money {
            amount,
            currency: self.currency.clone(),
        }
    }

    pub fn round_dp(&self, dp: u32) -> Money {
        Money {
            amount: self.amount.round_dp(dp),
            currency: self.currency.clone(),
        }
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
