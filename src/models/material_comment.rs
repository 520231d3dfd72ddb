use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CommentSnapshot;

/// A comment left by a project member on a material
///
/// Comments are soft-deleted so that request snapshots taken earlier
/// keep pointing at something that existed.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::material_comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MaterialComment {
    id: String,
    material_id: String,
    user_name: String,
    user_email: String,
    comment: String,
    is_deleted: bool,
    created_at: NaiveDateTime,
}

impl MaterialComment {
    pub fn new(material_id: String, user_name: String, user_email: String, comment: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            material_id,
            user_name,
            user_email,
            comment,
            is_deleted: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_material_id(&self) -> String {
        self.material_id.clone()
    }

    pub fn get_user_name(&self) -> String {
        self.user_name.clone()
    }

    pub fn get_user_email(&self) -> String {
        self.user_email.clone()
    }

    pub fn get_comment(&self) -> String {
        self.comment.clone()
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// The form embedded into request snapshots
    pub fn to_snapshot(&self) -> CommentSnapshot {
        CommentSnapshot {
            id: self.id.clone(),
            user_name: self.user_name.clone(),
            comment: self.comment.clone(),
            created_at: self.get_created_at(),
        }
    }
}
