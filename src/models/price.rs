use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// An alternative offer attached to a price (another size, finish, grade)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVariation {
    /// Identifier of the variation within its price
    #[serde(default)]
    pub id: String,

    /// Short description, e.g. "Thickness 12mm"
    pub label: String,

    /// Amount in the currency of the owning price
    pub amount: f64,

    /// Amount before any margin was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<f64>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// The fields needed to record a price against a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceDraft {
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub converted_amount: Option<f64>,
    #[serde(default)]
    pub supplier_reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub variations: Vec<PriceVariation>,
}

/// A price for a material, as shown to the project owner
///
/// Maps to the `prices` table. `converted_amount` is the amount in the
/// settlement currency at the time the price was recorded.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Price {
    id: String,
    material_id: String,
    supplier_id: Option<String>,
    country: Option<String>,
    amount: f64,
    currency: String,
    converted_amount: Option<f64>,
    supplier_reference: Option<String>,
    notes: Option<String>,
    variations: JsonValue,
    created_at: NaiveDateTime,
}

impl Price {
    /// Creates a new price for `material_id` from a draft
    pub fn new(material_id: String, draft: PriceDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            material_id,
            supplier_id: draft.supplier_id,
            country: draft.country,
            amount: draft.amount,
            currency: draft.currency.trim().to_uppercase(),
            converted_amount: draft.converted_amount,
            supplier_reference: draft.supplier_reference,
            notes: draft.notes,
            variations: JsonValue(serde_json::to_value(&draft.variations).unwrap_or_default()),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_material_id(&self) -> String {
        self.material_id.clone()
    }

    pub fn get_supplier_id(&self) -> Option<String> {
        self.supplier_id.clone()
    }

    pub fn get_country(&self) -> Option<String> {
        self.country.clone()
    }

    pub fn get_amount(&self) -> f64 {
        self.amount
    }

    pub fn get_currency(&self) -> String {
        self.currency.clone()
    }

    pub fn get_converted_amount(&self) -> Option<f64> {
        self.converted_amount
    }

    /// The amount used when ranking prices: converted when known, raw otherwise
    pub fn comparable_amount(&self) -> f64 {
        self.converted_amount.unwrap_or(self.amount)
    }

    pub fn get_supplier_reference(&self) -> Option<String> {
        self.supplier_reference.clone()
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    /// Decodes the stored variations; malformed entries yield an empty list
    pub fn get_variations(&self) -> Vec<PriceVariation> {
        serde_json::from_value(self.variations.0.clone()).unwrap_or_default()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_new_normalizes_currency_and_keeps_variations() {
        let price = Price::new(
            "material-1".to_string(),
            PriceDraft {
                amount: 12.5,
                currency: " cny ".to_string(),
                variations: vec![PriceVariation {
                    id: "v1".to_string(),
                    label: "Large".to_string(),
                    amount: 15.0,
                    original_amount: None,
                    notes: None,
                }],
                ..Default::default()
            },
        );

        assert_eq!(price.get_currency(), "CNY");
        assert_eq!(price.get_variations().len(), 1);
        assert_eq!(price.get_variations()[0].amount, 15.0);
    }

    #[test]
    fn test_comparable_amount_prefers_converted() {
        let mut draft = PriceDraft {
            amount: 10.0,
            currency: "CNY".to_string(),
            ..Default::default()
        };
        assert_eq!(Price::new("m".to_string(), draft.clone()).comparable_amount(), 10.0);

        draft.converted_amount = Some(950.0);
        assert_eq!(Price::new("m".to_string(), draft).comparable_amount(), 950.0);
    }
}
