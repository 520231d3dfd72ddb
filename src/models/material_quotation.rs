use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JsonValue, PriceVariation, QuotationStatus};

/// The fields of an archived price record, before it gets an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QuotationDraft {
    pub material_name: String,
    #[serde(default)]
    pub material_category: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub supplier_email: String,
    #[serde(default)]
    pub supplier_company: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub supplier_country: Option<String>,
    pub unit_price: f64,
    pub currency: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub moq: Option<i32>,
    #[serde(default)]
    pub variations: Vec<PriceVariation>,
    #[serde(default)]
    pub converted_price_fcfa: Option<f64>,
    #[serde(default)]
    pub exchange_rate_used: Option<f64>,
    #[serde(default)]
    pub source_quote_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An archived supplier price, kept for cross-supplier comparison
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::material_quotations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MaterialQuotation {
    id: String,
    material_name: String,
    material_category: Option<String>,
    project_id: Option<String>,
    supplier_email: String,
    supplier_company: Option<String>,
    supplier_name: Option<String>,
    supplier_country: Option<String>,
    unit_price: f64,
    currency: String,
    unit: Option<String>,
    moq: Option<i32>,
    variations: JsonValue,
    converted_price_fcfa: Option<f64>,
    exchange_rate_used: Option<f64>,
    source_quote_id: Option<String>,
    notes: Option<String>,
    status: String,
    created_at: NaiveDateTime,
}

impl MaterialQuotation {
    /// Creates an active quotation from a draft
    pub fn new(draft: QuotationDraft) -> Self {
        Self::new_at(draft, Utc::now())
    }

    /// Creates an active quotation with an explicit creation time
    pub fn new_at(draft: QuotationDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            material_name: draft.material_name.trim().to_string(),
            material_category: draft.material_category,
            project_id: draft.project_id,
            supplier_email: draft.supplier_email,
            supplier_company: draft.supplier_company,
            supplier_name: draft.supplier_name,
            supplier_country: draft.supplier_country,
            unit_price: draft.unit_price,
            currency: draft.currency.trim().to_uppercase(),
            unit: draft.unit,
            moq: draft.moq,
            variations: JsonValue(serde_json::to_value(&draft.variations).unwrap_or_default()),
            converted_price_fcfa: draft.converted_price_fcfa,
            exchange_rate_used: draft.exchange_rate_used,
            source_quote_id: draft.source_quote_id,
            notes: draft.notes,
            status: QuotationStatus::Active.as_str().to_string(),
            created_at: created_at.naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_material_name(&self) -> String {
        self.material_name.clone()
    }

    pub fn get_material_category(&self) -> Option<String> {
        self.material_category.clone()
    }

    pub fn get_project_id(&self) -> Option<String> {
        self.project_id.clone()
    }

    pub fn get_supplier_email(&self) -> String {
        self.supplier_email.clone()
    }

    pub fn get_supplier_company(&self) -> Option<String> {
        self.supplier_company.clone()
    }

    pub fn get_supplier_name(&self) -> Option<String> {
        self.supplier_name.clone()
    }

    pub fn get_supplier_country(&self) -> Option<String> {
        self.supplier_country.clone()
    }

    pub fn get_unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn get_currency(&self) -> String {
        self.currency.clone()
    }

    pub fn get_unit(&self) -> Option<String> {
        self.unit.clone()
    }

    pub fn get_moq(&self) -> Option<i32> {
        self.moq
    }

    pub fn get_variations(&self) -> Vec<PriceVariation> {
        serde_json::from_value(self.variations.0.clone()).unwrap_or_default()
    }

    pub fn get_converted_price_fcfa(&self) -> Option<f64> {
        self.converted_price_fcfa
    }

    pub fn get_exchange_rate_used(&self) -> Option<f64> {
        self.exchange_rate_used
    }

    pub fn get_source_quote_id(&self) -> Option<String> {
        self.source_quote_id.clone()
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
