//! Currency conversion
//!
//! Upstream prices are always EUR. Conversion goes through the
//! [`CurrencyConverter`] seam so a host can plug in live reference rates;
//! [`StaticRateTable`] is the configured EUR-based table used by default.

use crate::error::{EdsError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Converts an amount between two ISO currency codes as of a date
pub trait CurrencyConverter: Send + Sync {
    fn convert(&self, value: f64, from: &str, to: &str, as_of: NaiveDate) -> Result<f64>;
}

/// Fixed EUR-based rate table (units of currency per 1 EUR)
#[derive(Debug, Clone)]
pub struct StaticRateTable {
    rates: HashMap<String, f64>,
}

impl StaticRateTable {
    pub fn new(rates: HashMap<String, f64>) -> Result<Self> {
        for (code, rate) in &rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(EdsError::validation(
                    format!("currency_rates.{}", code),
                    "rate must be a positive number",
                ));
            }
        }
        Ok(Self { rates })
    }

    /// Reference rates for the currencies in the region catalog
    pub fn default_rates() -> HashMap<String, f64> {
        [
            ("DKK", 7.4604),
            ("NOK", 11.55),
            ("SEK", 11.30),
            ("USD", 1.08),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Whether prices can be converted into `code`
    pub fn supports(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }

    fn rate(&self, code: &str) -> Option<f64> {
        if code == "EUR" {
            return Some(1.0);
        }
        self.rates.get(code).copied()
    }
}

impl Default for StaticRateTable {
    fn default() -> Self {
        Self {
            rates: Self::default_rates(),
        }
    }
}

impl CurrencyConverter for StaticRateTable {
    fn convert(&self, value: f64, from: &str, to: &str, _as_of: NaiveDate) -> Result<f64> {
        if from == to {
            return Ok(value);
        }
        let (Some(from_rate), Some(to_rate)) = (self.rate(from), self.rate(to)) else {
            return Err(EdsError::currency(format!(
                "no rate for {} -> {}",
                from, to
            )));
        };
        Ok(value / from_rate * to_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn converts_from_eur() {
        let table = StaticRateTable::default();
        let dkk = table.convert(100.0, "EUR", "DKK", day()).unwrap();
        assert!((dkk - 746.04).abs() < 1e-9);
    }

    #[test]
    fn cross_rates_go_through_eur() {
        let mut rates = HashMap::new();
        rates.insert("DKK".to_string(), 7.5);
        rates.insert("SEK".to_string(), 11.25);
        let table = StaticRateTable::new(rates).unwrap();
        let sek = table.convert(7.5, "DKK", "SEK", day()).unwrap();
        assert!((sek - 11.25).abs() < 1e-9);
    }

    #[test]
    fn unknown_pair_is_an_error() {
        let table = StaticRateTable::default();
        let err = table.convert(1.0, "EUR", "XYZ", day()).unwrap_err();
        assert!(matches!(err, EdsError::Currency { .. }));
    }

    #[test]
    fn rejects_non_positive_rates() {
        let mut rates = HashMap::new();
        rates.insert("DKK".to_string(), 0.0);
        assert!(StaticRateTable::new(rates).is_err());
    }
}
