use std::collections::HashMap;

use crate::models::ExchangeRate;

/// The settlement currency clients are billed in
pub const SETTLEMENT_CURRENCY: &str = "FCFA";

/// Rate applied when no stored rate converts a price to FCFA (CNY -> FCFA)
pub const DEFAULT_FALLBACK_RATE: f64 = 95.0;

/// Normalizes a currency code, treating `XAF` as `FCFA`
pub fn normalize_currency(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code == "XAF" {
        SETTLEMENT_CURRENCY.to_string()
    } else {
        code
    }
}

/// Rates to FCFA used when the rate table cannot be read
pub fn fallback_rates_to_fcfa() -> HashMap<&'static str, f64> {
    HashMap::from([
        ("FCFA", 1.0),
        ("CNY", 85.0),
        ("USD", 600.0),
        ("EUR", 655.0),
        ("GBP", 765.0),
        ("TRY", 20.0),
        ("AED", 163.0),
    ])
}

/// In-memory view of the stored exchange rates
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateTable {
    rates: HashMap<(String, String), f64>,
}

impl ExchangeRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from stored rows
    pub fn from_rows(rows: &[ExchangeRate]) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(&row.get_from_currency(), &row.get_to_currency(), row.get_rate());
        }
        table
    }

    /// Builds a table from the static fallback rates
    pub fn fallback() -> Self {
        let mut table = Self::new();
        for (code, rate) in fallback_rates_to_fcfa() {
            if code != SETTLEMENT_CURRENCY {
                table.insert(code, SETTLEMENT_CURRENCY, rate);
            }
        }
        table
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: f64) {
        self.rates
            .insert((normalize_currency(from), normalize_currency(to)), rate);
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// The stored rate for a direct pair, or 1.0 for identical currencies
    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = normalize_currency(from);
        let to = normalize_currency(to);
        if from == to {
            return Some(1.0);
        }
        self.rates.get(&(from, to)).copied()
    }

    /// Converts using the direct pair, or dividing by the reverse pair
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        if let Some(rate) = self.rate(from, to) {
            return Some(amount * rate);
        }
        let reverse = self
            .rates
            .get(&(normalize_currency(to), normalize_currency(from)))
            .copied()?;
        if reverse == 0.0 {
            return None;
        }
        Some(amount / reverse)
    }

    /// Converts, multiplying by `fallback_rate` when no rate is known
    pub fn convert_or_fallback(&self, amount: f64, from: &str, to: &str, fallback_rate: f64) -> f64 {
        self.convert(amount, from, to)
            .unwrap_or(amount * fallback_rate)
    }

    /// The rate actually used by [`Self::convert_or_fallback`]
    pub fn effective_rate(&self, from: &str, to: &str, fallback_rate: f64) -> f64 {
        self.convert(1.0, from, to).unwrap_or(fallback_rate)
    }
}
