use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::DatabaseConnection;

use crate::{EngineError, ExchangeRates, FixedRates, ResultEngine};

pub mod accounts;
pub mod categories;
mod contacts;
pub mod currencies;
mod emails;
pub mod transactions;
pub mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Stored amounts keep three fraction digits; every rescale rounds
/// half-even back to that precision.
const AMOUNT_SCALE: u32 = 3;

pub(super) fn apply_rate(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate).round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    rates: Arc<dyn ExchangeRates>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(super) fn rates(&self) -> &dyn ExchangeRates {
        self.rates.as_ref()
    }
}

fn normalize_required_name(value: &str, label: &str, max_len: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::BadRequest(format!(
            "{label} must not be empty"
        )));
    }
    if trimmed.chars().count() > max_len {
        return Err(EngineError::BadRequest(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    rates: Option<Arc<dyn ExchangeRates>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the exchange-rate provider. Defaults to an empty fixed table,
    /// which only resolves identity conversions.
    pub fn rates(mut self, rates: Arc<dyn ExchangeRates>) -> EngineBuilder {
        self.rates = Some(rates);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            rates: self
                .rates
                .unwrap_or_else(|| Arc::new(FixedRates::default())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn apply_rate_keeps_three_fraction_digits() {
        assert_eq!(apply_rate(dec!(50.000), dec!(0.90)), dec!(45.000));
        assert_eq!(apply_rate(dec!(10.001), dec!(2)), dec!(20.002));
    }

    #[test]
    fn apply_rate_rounds_half_even() {
        // ties at the fourth fraction digit resolve towards the even neighbor
        assert_eq!(apply_rate(dec!(0.11115), dec!(10)), dec!(1.112));
        assert_eq!(apply_rate(dec!(0.11125), dec!(10)), dec!(1.112));
    }

    #[test]
    fn normalize_required_name_trims_and_bounds() {
        assert_eq!(
            normalize_required_name("  Food ", "category name", 50).unwrap(),
            "Food"
        );
        assert!(normalize_required_name("   ", "category name", 50).is_err());
        assert!(normalize_required_name(&"x".repeat(51), "category name", 50).is_err());
    }
}
