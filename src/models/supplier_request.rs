use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JsonValue, RequestStatus};

/// Length of the token embedded in the public supplier link
pub const PUBLIC_TOKEN_LENGTH: usize = 32;

/// Longest expiry a request may be given, in days
pub const MAX_EXPIRY_DAYS: i64 = 3650;

/// The moment `days` days after `now`, or None when it cannot be represented
pub fn expiry_after(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|delta| now.checked_add_signed(delta))
}

/// A comment carried along with a material in a request snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSnapshot {
    pub id: String,
    pub user_name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A material as frozen into a request for quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMaterial {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub comments: Vec<CommentSnapshot>,
}

/// Options chosen by the client when requesting quotations
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub num_suppliers: i32,
    pub country: String,
    pub shipping_type: String,
    pub notes: Option<String>,
    pub expires_in_days: Option<i64>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            num_suppliers: 3,
            country: "China".to_string(),
            shipping_type: "sea".to_string(),
            notes: None,
            expires_in_days: None,
        }
    }
}

/// A request for quotation sent out for one project
///
/// Suppliers reach the request through `public_token` without an account;
/// `materials_data` is a snapshot so later edits to the project do not
/// change what suppliers are quoting.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::supplier_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SupplierRequest {
    id: String,
    project_id: String,
    owner_id: String,
    request_number: String,
    public_token: String,
    status: String,
    num_suppliers: i32,
    materials_data: JsonValue,
    total_materials: i32,
    filled_materials: i32,
    country: String,
    shipping_type: String,
    notes: Option<String>,
    expires_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    /// Bumped each time the snapshot is refreshed from the project
    materials_version: i32,
    last_materials_update: Option<NaiveDateTime>,
}

impl SupplierRequest {
    /// Creates a new pending request with a fresh request number and token
    pub fn new(
        project_id: String,
        owner_id: String,
        materials: &[RequestMaterial],
        options: RequestOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            owner_id,
            request_number: generate_request_number(now),
            public_token: generate_public_token(),
            status: RequestStatus::PendingAdmin.as_str().to_string(),
            num_suppliers: options.num_suppliers,
            materials_data: JsonValue(serde_json::to_value(materials).unwrap_or_default()),
            total_materials: materials.len() as i32,
            filled_materials: 0,
            country: options.country,
            shipping_type: options.shipping_type,
            notes: options.notes,
            expires_at: options
                .expires_in_days
                .and_then(|days| expiry_after(now, days))
                .map(|at| at.naive_utc()),
            created_at: now.naive_utc(),
            materials_version: 1,
            last_materials_update: None,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_project_id(&self) -> String {
        self.project_id.clone()
    }

    pub fn get_owner_id(&self) -> String {
        self.owner_id.clone()
    }

    pub fn get_request_number(&self) -> String {
        self.request_number.clone()
    }

    pub fn get_public_token(&self) -> String {
        self.public_token.clone()
    }

    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    pub fn get_num_suppliers(&self) -> i32 {
        self.num_suppliers
    }

    pub fn get_materials(&self) -> Vec<RequestMaterial> {
        serde_json::from_value(self.materials_data.0.clone()).unwrap_or_default()
    }

    pub fn get_total_materials(&self) -> i32 {
        self.total_materials
    }

    pub fn get_filled_materials(&self) -> i32 {
        self.filled_materials
    }

    /// Share of snapshot materials that received at least one price, 0-100
    pub fn progress_percentage(&self) -> f64 {
        if self.total_materials == 0 {
            return 0.0;
        }
        (self.filled_materials as f64 / self.total_materials as f64 * 100.0).round()
    }

    pub fn get_country(&self) -> String {
        self.country.clone()
    }

    pub fn get_shipping_type(&self) -> String {
        self.shipping_type.clone()
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }

    /// Whether the request no longer accepts submissions at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.get_expires_at().is_some_and(|at| at < now)
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_materials_version(&self) -> i32 {
        self.materials_version
    }

    pub fn get_last_materials_update(&self) -> Option<DateTime<Utc>> {
        self.last_materials_update
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }
}

/// Builds a request number of the form `REQ-<unix millis>-<6 uppercase alphanumerics>`
pub fn generate_request_number(now: DateTime<Utc>) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), 6).to_uppercase();
    format!("REQ-{}-{}", now.timestamp_millis(), suffix)
}

/// Builds the random token used in public supplier links
pub fn generate_public_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), PUBLIC_TOKEN_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(name: &str) -> RequestMaterial {
        RequestMaterial {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            category: None,
            quantity: Some(10.0),
            unit: None,
            images: vec![],
            comments: vec![],
        }
    }

    #[test]
    fn test_request_number_format() {
        let now = Utc::now();
        let number = generate_request_number(now);
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "REQ");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_public_token_length() {
        let token = generate_public_token();
        assert_eq!(token.len(), PUBLIC_TOKEN_LENGTH);
        assert_ne!(token, generate_public_token());
    }

    #[test]
    fn test_new_request_defaults() {
        let request = SupplierRequest::new(
            "project-1".to_string(),
            "owner-1".to_string(),
            &[material("Ciment"), material("Sable")],
            RequestOptions::default(),
        );

        assert_eq!(request.get_status(), "pending_admin");
        assert_eq!(request.get_total_materials(), 2);
        assert_eq!(request.get_filled_materials(), 0);
        assert_eq!(request.get_num_suppliers(), 3);
        assert_eq!(request.get_country(), "China");
        assert_eq!(request.get_shipping_type(), "sea");
        assert_eq!(request.get_materials()[1].name, "Sable");
        assert_eq!(request.progress_percentage(), 0.0);
        assert!(!request.is_expired(Utc::now()));
    }

    #[test]
    fn test_request_expiry() {
        let request = SupplierRequest::new(
            "project-1".to_string(),
            "owner-1".to_string(),
            &[],
            RequestOptions {
                expires_in_days: Some(7),
                ..Default::default()
            },
        );

        assert!(!request.is_expired(Utc::now()));
        assert!(request.is_expired(Utc::now() + Duration::days(8)));
    }

    #[test]
    fn test_expiry_out_of_range_is_none() {
        let now = Utc::now();
        assert!(expiry_after(now, 100_000_000).is_none());
        assert!(expiry_after(now, i64::MAX).is_none());
        assert_eq!(expiry_after(now, MAX_EXPIRY_DAYS), Some(now + Duration::days(MAX_EXPIRY_DAYS)));
    }

    #[test]
    fn test_new_request_starts_at_first_materials_version() {
        let request = SupplierRequest::new(
            "project-1".to_string(),
            "owner-1".to_string(),
            &[material("Ciment")],
            RequestOptions::default(),
        );

        assert_eq!(request.get_materials_version(), 1);
        assert!(request.get_last_materials_update().is_none());
    }
}
