use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// Kind of notification sent when brokered prices reach a project
pub const QUOTE_RECEIVED: &str = "quote_received";

/// Kind of notification sent to a project owner when an invitation is accepted
pub const COLLABORATION_ACCEPTED: &str = "collaboration_accepted";

/// A notice shown to one user
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Notification {
    id: String,
    user_id: String,
    kind: String,
    title: String,
    message: String,
    link: Option<String>,
    data: JsonValue,
    read: bool,
    created_at: NaiveDateTime,
}

impl Notification {
    pub fn new(
        user_id: String,
        kind: &str,
        title: String,
        message: String,
        link: Option<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            kind: kind.to_string(),
            title,
            message,
            link,
            data: JsonValue(data),
            read: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_kind(&self) -> String {
        self.kind.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_message(&self) -> String {
        self.message.clone()
    }

    pub fn get_link(&self) -> Option<String> {
        self.link.clone()
    }

    pub fn get_data(&self) -> serde_json::Value {
        self.data.0.clone()
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
