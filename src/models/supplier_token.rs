use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supplier_request::{expiry_after, generate_public_token};
use super::{JsonValue, MaterialChange, RequestMaterial, SupplierIdentity, TokenStatus};

/// Days a supplier link stays valid when its request has no expiry
pub const DEFAULT_LINK_LIFETIME_DAYS: i64 = 30;

/// Most supplier links a request may hand out in one go
pub const MAX_LINKS_PER_BATCH: i32 = 50;

/// A material that changed since the supplier last saw the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub material_id: String,
    pub material_name: String,
    pub change_type: MaterialChange,
    pub updated_at: DateTime<Utc>,
}

/// The personal link handed to one supplier of a request
///
/// Each supplier gets its own token so views and submissions can be tracked
/// per supplier. The identity columns stay empty until the supplier answers.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::supplier_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SupplierToken {
    id: String,
    supplier_request_id: String,
    token: String,
    status: String,
    supplier_name: Option<String>,
    supplier_email: Option<String>,
    supplier_company: Option<String>,
    supplier_country: Option<String>,
    materials_version: i32,
    has_pending_updates: bool,
    pending_updates: JsonValue,
    view_count: i32,
    first_viewed_at: Option<NaiveDateTime>,
    last_viewed_at: Option<NaiveDateTime>,
    last_synced_at: Option<NaiveDateTime>,
    submitted_at: Option<NaiveDateTime>,
    expires_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
}

impl SupplierToken {
    /// Creates a pending link on a request
    ///
    /// The link expires with its request, or after
    /// [`DEFAULT_LINK_LIFETIME_DAYS`] when the request never expires.
    pub fn new(
        supplier_request_id: String,
        materials_version: i32,
        request_expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        let expires_at = request_expires_at.or_else(|| expiry_after(now, DEFAULT_LINK_LIFETIME_DAYS));
        Self {
            id: Uuid::new_v4().to_string(),
            supplier_request_id,
            token: generate_public_token(),
            status: TokenStatus::Pending.as_str().to_string(),
            supplier_name: None,
            supplier_email: None,
            supplier_company: None,
            supplier_country: None,
            materials_version,
            has_pending_updates: false,
            pending_updates: JsonValue(serde_json::Value::Array(vec![])),
            view_count: 0,
            first_viewed_at: None,
            last_viewed_at: None,
            last_synced_at: None,
            submitted_at: None,
            expires_at: expires_at.map(|at| at.naive_utc()),
            created_at: now.naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_supplier_request_id(&self) -> String {
        self.supplier_request_id.clone()
    }

    pub fn get_token(&self) -> String {
        self.token.clone()
    }

    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    /// Who answered through this link, if anyone has yet
    pub fn get_supplier(&self) -> Option<SupplierIdentity> {
        Some(SupplierIdentity {
            name: self.supplier_name.clone()?,
            email: self.supplier_email.clone()?,
            company: self.supplier_company.clone(),
            country: self.supplier_country.clone().unwrap_or_default(),
            phone: None,
        })
    }

    /// A name to show administrators: the company, else the contact name
    pub fn display_name(&self) -> Option<String> {
        self.supplier_company.clone().or_else(|| self.supplier_name.clone())
    }

    pub fn get_materials_version(&self) -> i32 {
        self.materials_version
    }

    pub fn has_pending_updates(&self) -> bool {
        self.has_pending_updates
    }

    pub fn get_pending_updates(&self) -> Vec<PendingUpdate> {
        serde_json::from_value(self.pending_updates.0.clone()).unwrap_or_default()
    }

    pub fn get_view_count(&self) -> i32 {
        self.view_count
    }

    pub fn get_first_viewed_at(&self) -> Option<DateTime<Utc>> {
        self.first_viewed_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }

    pub fn get_last_viewed_at(&self) -> Option<DateTime<Utc>> {
        self.last_viewed_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }

    pub fn get_submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }

    pub fn get_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.get_expires_at().is_some_and(|at| at < now)
    }

    /// Whether the link still shows an older snapshot than `current_version`
    pub fn needs_sync(&self, current_version: i32) -> bool {
        self.materials_version < current_version
    }
}

/// Lists the materials suppliers should look at again after a refresh
///
/// A material is flagged when it is new, or when its description or images
/// changed. Removed materials are not flagged.
pub fn detect_material_changes(
    previous: &[RequestMaterial],
    current: &[RequestMaterial],
    now: DateTime<Utc>,
) -> Vec<PendingUpdate> {
    current
        .iter()
        .filter_map(|material| {
            let change_type = match previous.iter().find(|old| old.id == material.id) {
                None => MaterialChange::Added,
                Some(old) if old.description != material.description || old.images != material.images => {
                    MaterialChange::Updated
                }
                Some(_) => return None,
            };
            Some(PendingUpdate {
                material_id: material.id.clone(),
                material_name: material.name.clone(),
                change_type,
                updated_at: now,
            })
        })
        .collect()
}
