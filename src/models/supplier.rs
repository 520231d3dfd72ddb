use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// A supplier known to the platform
///
/// Prices forwarded to clients reference the broker supplier rather than
/// the real one, so the real identity stays in quotes and the archive.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::suppliers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Supplier {
    id: String,
    name: String,
    email: Option<String>,
    country: Option<String>,
    contact_info: JsonValue,
    created_at: NaiveDateTime,
}

impl Supplier {
    pub fn new(
        name: String,
        email: Option<String>,
        country: Option<String>,
        contact_info: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            country,
            contact_info: JsonValue(contact_info.unwrap_or_else(|| serde_json::json!({}))),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_email(&self) -> Option<String> {
        self.email.clone()
    }

    pub fn get_country(&self) -> Option<String> {
        self.country.clone()
    }

    pub fn get_contact_info(&self) -> serde_json::Value {
        self.contact_info.0.clone()
    }
}
