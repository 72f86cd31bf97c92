//! Event application: the pure fold that turns an event stream into state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::portfolio_errors::PortfolioError;
use super::portfolio_model::{Holding, Portfolio};
use crate::events::{DomainEvent, EventEnvelope};
use crate::ids::{InvestmentId, PortfolioId};
use crate::money::Money;
use foliotrack_market_data::Symbol;

impl Portfolio {
    /// Applies one event, returning the next state.
    ///
    /// Pure: no side effects, no I/O, and the receiver is untouched on
    /// error, so a rejected event never leaves partial state behind.
    ///
    /// Sequence discipline: `envelope.sequence` must be strictly greater
    /// than the watermark. Re-applying an already-seen envelope is rejected
    /// with [`PortfolioError::OutOfOrderEvent`], which makes redelivery
    /// safe - the state after the failed call is identical to the state
    /// after the first, successful one.
    pub fn apply(&self, envelope: &EventEnvelope) -> Result<Portfolio, PortfolioError> {
        if envelope.portfolio_id != self.id {
            return Err(PortfolioError::EventPortfolioMismatch {
                expected: self.id,
                got: envelope.portfolio_id,
            });
        }
        if self.deleted {
            return Err(PortfolioError::Tombstoned {
                portfolio_id: self.id,
            });
        }
        if envelope.sequence <= self.last_sequence {
            return Err(PortfolioError::OutOfOrderEvent {
                sequence: envelope.sequence,
                watermark: self.last_sequence,
            });
        }

        let mut next = self.clone();
        match &envelope.event {
            DomainEvent::InvestmentAdded {
                investment_id,
                symbol,
                quantity,
                purchase_price,
                purchase_date,
            } => next.add_investment(
                *investment_id,
                symbol.clone(),
                *quantity,
                purchase_price.clone(),
                *purchase_date,
            )?,

            DomainEvent::SharesBought {
                investment_id,
                quantity,
                price,
                ..
            } => next.buy_shares(*investment_id, *quantity, price)?,

            DomainEvent::SharesSold {
                investment_id,
                quantity,
                ..
            } => next.sell_shares(*investment_id, *quantity)?,

            DomainEvent::InvestmentRemoved { investment_id, .. } => {
                if next.holdings.remove(investment_id).is_none() {
                    return Err(PortfolioError::UnknownInvestment {
                        investment_id: *investment_id,
                    });
                }
            }

            DomainEvent::PriceObserved {
                symbol,
                price,
                observed_at,
                ..
            } => next.observe_price(symbol, price, *observed_at),

            // Income is a projection concern; the aggregate only advances
            // its watermark.
            DomainEvent::IncomeRecorded { .. } => {}

            DomainEvent::PortfolioDeleted { .. } => {
                next.holdings.clear();
                next.deleted = true;
            }
        }

        next.last_sequence = envelope.sequence;
        Ok(next)
    }

    /// Folds an ordered event sequence into state.
    ///
    /// The empty stream yields a portfolio with zero holdings, which is a
    /// valid state.
    pub fn load<'a, I>(id: PortfolioId, events: I) -> Result<Portfolio, PortfolioError>
    where
        I: IntoIterator<Item = &'a EventEnvelope>,
    {
        events
            .into_iter()
            .try_fold(Portfolio::new(id), |state, envelope| state.apply(envelope))
    }

    fn add_investment(
        &mut self,
        investment_id: InvestmentId,
        symbol: Symbol,
        quantity: Decimal,
        purchase_price: Money,
        purchase_date: chrono::NaiveDate,
    ) -> Result<(), PortfolioError> {
        if self.holdings.contains_key(&investment_id) {
            return Err(PortfolioError::DuplicateInvestment { investment_id });
        }
        ensure_positive_quantity(quantity)?;
        ensure_positive_price(&purchase_price)?;
        self.holdings.insert(
            investment_id,
            Holding::new(investment_id, symbol, quantity, purchase_price, purchase_date),
        );
        Ok(())
    }

    fn buy_shares(
        &mut self,
        investment_id: InvestmentId,
        quantity: Decimal,
        price: &Money,
    ) -> Result<(), PortfolioError> {
        ensure_positive_quantity(quantity)?;
        ensure_positive_price(price)?;
        let holding = self
            .holdings
            .get_mut(&investment_id)
            .ok_or(PortfolioError::UnknownInvestment { investment_id })?;

        if price.currency() != holding.unit_cost.currency() {
            return Err(PortfolioError::CurrencyMismatch {
                investment_id,
                position_currency: holding.unit_cost.currency().to_string(),
                event_currency: price.currency().to_string(),
            });
        }

        // Weighted-average cost basis across old and new shares.
        let total_quantity = holding.quantity + quantity;
        let total_cost = holding.cost_basis().amount() + price.amount() * quantity;
        holding.unit_cost = holding.unit_cost.with_amount(total_cost / total_quantity);
        holding.quantity = total_quantity;
        Ok(())
    }

    fn sell_shares(
        &mut self,
        investment_id: InvestmentId,
        quantity: Decimal,
    ) -> Result<(), PortfolioError> {
        ensure_positive_quantity(quantity)?;
        let holding = self
            .holdings
            .get_mut(&investment_id)
            .ok_or(PortfolioError::UnknownInvestment { investment_id })?;

        if quantity > holding.quantity {
            return Err(PortfolioError::InsufficientQuantity {
                investment_id,
                held: holding.quantity,
                requested: quantity,
            });
        }

        // Unit cost is unchanged by a sale; the basis shrinks with the
        // quantity.
        holding.quantity -= quantity;
        Ok(())
    }

    fn observe_price(&mut self, symbol: &Symbol, price: &Money, observed_at: DateTime<Utc>) {
        for holding in self.holdings.values_mut() {
            if &holding.symbol != symbol {
                continue;
            }
            // Last writer wins by observation time; an older observation
            // arriving late is ignored, not an error.
            if holding.priced_at.is_some_and(|t| observed_at <= t) {
                continue;
            }
            holding.latest_price = Some(price.clone());
            holding.priced_at = Some(observed_at);
        }
    }
}

fn ensure_positive_quantity(quantity: Decimal) -> Result<(), PortfolioError> {
    if quantity <= Decimal::ZERO {
        return Err(PortfolioError::InvalidQuantity { quantity });
    }
    Ok(())
}

fn ensure_positive_price(price: &Money) -> Result<(), PortfolioError> {
    if price.amount() <= Decimal::ZERO {
        return Err(PortfolioError::InvalidPrice {
            price: price.amount(),
        });
    }
    Ok(())
}
