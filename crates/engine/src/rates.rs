//! Exchange-rate lookup boundary.
//!
//! The engine never computes conversion rates itself; it asks an
//! [`ExchangeRates`] implementation for the multiplier between two currency
//! codes and applies it. The binary wires in a [`FixedRates`] table loaded
//! from configuration; a real deployment would plug an external rate feed
//! behind the same trait.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;

/// Conversion-rate provider between two currency codes.
pub trait ExchangeRates: fmt::Debug + Send + Sync {
    /// Multiplier converting an amount in `from` into `to`.
    ///
    /// Units are new-currency-per-old-currency: `amount_to = amount_from *
    /// rate`. Returns `None` when no rate is known for the pair.
    fn rate(&self, from: &str, to: &str) -> Option<Decimal>;
}

/// Static rate table.
///
/// Pairs are stored directionally but looked up both ways; the reverse
/// direction uses the reciprocal.
#[derive(Debug, Default)]
pub struct FixedRates {
    table: HashMap<(String, String), Decimal>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mostly for tests and settings loading.
    #[must_use]
    pub fn with(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.insert(from, to, rate);
        self
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) {
        self.table
            .insert((from.to_uppercase(), to.to_uppercase()), rate);
    }
}

impl ExchangeRates for FixedRates {
    fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.table.get(&(from.clone(), to.clone())) {
            return Some(*rate);
        }
        self.table
            .get(&(to, from))
            .filter(|rate| !rate.is_zero())
            .map(|rate| Decimal::ONE / rate)
    }
}
