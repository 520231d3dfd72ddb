use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JsonValue, PriceVariation, QuoteStatus};

/// One price offered by a supplier for a quoted material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedPrice {
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub moq: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub variations: Vec<PriceVariation>,
}

/// A material line as answered by a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedMaterial {
    /// Identifier of the material in the request snapshot
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub prices: Vec<QuotedPrice>,
}

impl QuotedMaterial {
    /// Whether the supplier offered at least one price for this line
    pub fn has_prices(&self) -> bool {
        !self.unavailable && !self.prices.is_empty()
    }
}

/// Who answered a request for quotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierIdentity {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A supplier's answer to a request for quotation
///
/// The supplier identity is only visible to administrators; clients see
/// the anonymous reference returned by [`SupplierQuote::client_reference`].
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::supplier_quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SupplierQuote {
    id: String,
    supplier_request_id: String,
    supplier_name: String,
    supplier_email: String,
    supplier_company: Option<String>,
    supplier_country: String,
    supplier_phone: Option<String>,
    supplier_reference: Option<String>,
    quoted_materials: JsonValue,
    status: String,
    admin_margin: Option<f64>,
    submitted_at: NaiveDateTime,
    sent_to_client_at: Option<NaiveDateTime>,
}

impl SupplierQuote {
    /// Creates a submitted quote for `supplier_request_id`
    pub fn new(
        supplier_request_id: String,
        supplier: SupplierIdentity,
        quoted_materials: &[QuotedMaterial],
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let supplier_reference = Some(default_reference(&id));
        Self {
            id,
            supplier_request_id,
            supplier_name: supplier.name,
            supplier_email: supplier.email,
            supplier_company: supplier.company,
            supplier_country: supplier.country,
            supplier_phone: supplier.phone,
            supplier_reference,
            quoted_materials: JsonValue(serde_json::to_value(quoted_materials).unwrap_or_default()),
            status: QuoteStatus::Submitted.as_str().to_string(),
            admin_margin: None,
            submitted_at: Utc::now().naive_utc(),
            sent_to_client_at: None,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_supplier_request_id(&self) -> String {
        self.supplier_request_id.clone()
    }

    pub fn get_supplier(&self) -> SupplierIdentity {
        SupplierIdentity {
            name: self.supplier_name.clone(),
            email: self.supplier_email.clone(),
            company: self.supplier_company.clone(),
            country: self.supplier_country.clone(),
            phone: self.supplier_phone.clone(),
        }
    }

    pub fn get_supplier_country(&self) -> String {
        self.supplier_country.clone()
    }

    /// The anonymous reference shown to clients instead of the supplier name
    pub fn client_reference(&self) -> String {
        self.supplier_reference
            .clone()
            .unwrap_or_else(|| default_reference(&self.id))
    }

    pub fn get_quoted_materials(&self) -> Vec<QuotedMaterial> {
        serde_json::from_value(self.quoted_materials.0.clone()).unwrap_or_default()
    }

    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    pub fn is_sent_to_client(&self) -> bool {
        self.status == QuoteStatus::SentToClient.as_str()
    }

    pub fn get_admin_margin(&self) -> Option<f64> {
        self.admin_margin
    }

    pub fn get_submitted_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.submitted_at, Utc)
    }

    pub fn get_sent_to_client_at(&self) -> Option<DateTime<Utc>> {
        self.sent_to_client_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }
}

/// `REF-` followed by the first eight characters of the quote id, uppercased
pub fn default_reference(quote_id: &str) -> String {
    let prefix: String = quote_id.chars().take(8).collect();
    format!("REF-{}", prefix.to_uppercase())
}
