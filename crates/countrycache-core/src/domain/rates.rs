use std::collections::BTreeMap;

/// Currency code to exchange rate (units per base currency) for one refresh cycle.
///
/// Only finite, strictly positive rates are kept, so every rate in the table
/// is a valid divisor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRateTable {
    rates: BTreeMap<String, f64>,
}

impl ExchangeRateTable {
    /// Build a table, returning it together with the codes that were rejected.
    pub fn from_rates<I, K>(rates: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut table = BTreeMap::new();
        let mut rejected = Vec::new();
        for (code, rate) in rates {
            let code = code.into();
            if rate.is_finite() && rate > 0.0 {
                table.insert(code, rate);
            } else {
                rejected.push(code);
            }
        }
        (Self { rates: table }, rejected)
    }

    /// Exact (case-sensitive) lookup, as currency codes are upper-case ISO 4217.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
