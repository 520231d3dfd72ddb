use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CollaboratorRole, CollaboratorStatus};

/// An email invited to work on a project
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::project_collaborators)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProjectCollaborator {
    id: String,
    project_id: String,
    email: String,
    role: String,
    status: String,
    invited_by: String,
    invited_at: NaiveDateTime,
    accepted_at: Option<NaiveDateTime>,
}

impl ProjectCollaborator {
    /// Creates a pending invitation; the email is stored lowercased
    pub fn new(project_id: String, email: &str, role: CollaboratorRole, invited_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            email: email.trim().to_lowercase(),
            role: role.as_str().to_string(),
            status: CollaboratorStatus::Pending.as_str().to_string(),
            invited_by,
            invited_at: Utc::now().naive_utc(),
            accepted_at: None,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_project_id(&self) -> String {
        self.project_id.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_role(&self) -> String {
        self.role.clone()
    }

    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    pub fn get_invited_by(&self) -> String {
        self.invited_by.clone()
    }

    pub fn get_accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
            .map(|at| DateTime::from_naive_utc_and_offset(at, Utc))
    }
}
