use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::PriceVariation;

/// Lowest accepted margin; anything at or below it would zero or negate prices
pub const MIN_MARGIN_PERCENT: f64 = -100.0;

/// Marks `amount` up by `margin_percent` percent
pub fn price_with_margin(amount: f64, margin_percent: f64) -> f64 {
    if margin_percent == 0.0 {
        return amount;
    }
    amount * (1.0 + margin_percent / 100.0)
}

/// The markup that `margin_percent` adds on top of `amount`
pub fn margin_amount(amount: f64, margin_percent: f64) -> f64 {
    amount * margin_percent / 100.0
}

/// Checks that a margin can be applied to a price
pub fn validate_margin(margin_percent: f64) -> Result<(), String> {
    if !margin_percent.is_finite() {
        return Err("Margin must be a finite number".to_string());
    }
    if margin_percent <= MIN_MARGIN_PERCENT {
        return Err(format!(
            "Margin must be greater than {}%, got {}%",
            MIN_MARGIN_PERCENT, margin_percent
        ));
    }
    Ok(())
}

/// How an administrator marks up the lines of a quote
///
/// With `individual_margins` unset every line gets `global_margin`. Once
/// individual margins are enabled, a line without an entry gets no markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginPolicy {
    #[serde(default)]
    pub global_margin: f64,
    #[serde(default)]
    pub individual_margins: Option<HashMap<String, f64>>,
}

impl MarginPolicy {
    /// A policy applying the same margin to every line
    pub fn global(margin_percent: f64) -> Self {
        Self {
            global_margin: margin_percent,
            individual_margins: None,
        }
    }

    /// The margin for a given quoted material
    pub fn margin_for(&self, material_id: &str) -> f64 {
        match &self.individual_margins {
            Some(margins) => margins.get(material_id).copied().unwrap_or(0.0),
            None => self.global_margin,
        }
    }

    /// Overwrites every individual margin with the global one
    pub fn apply_global_to_all(&mut self) {
        let global = self.global_margin;
        if let Some(margins) = self.individual_margins.as_mut() {
            for margin in margins.values_mut() {
                *margin = global;
            }
        }
    }

    /// Validates the global margin and every individual margin
    pub fn validate(&self) -> Result<(), String> {
        validate_margin(self.global_margin)?;
        if let Some(margins) = &self.individual_margins {
            for (material_id, margin) in margins {
                validate_margin(*margin)
                    .map_err(|e| format!("{} (material {})", e, material_id))?;
            }
        }
        Ok(())
    }
}

/// Marks every variation up by `margin_percent`, recording the amount it had before
pub fn apply_margin_to_variations(
    variations: &[PriceVariation],
    margin_percent: f64,
) -> Vec<PriceVariation> {
    variations
        .iter()
        .map(|variation| {
            let original = variation.original_amount.unwrap_or(variation.amount);
            PriceVariation {
                amount: price_with_margin(original, margin_percent),
                original_amount: Some(original),
                ..variation.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod prop_tests;
