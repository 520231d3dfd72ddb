use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a sourcing project owned by a single tenant
///
/// This struct maps directly to the `projects` table in the database.
/// A project groups the materials a client wants quoted, and is the unit
/// that supplier requests, collaborators and comparisons hang off.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Project {
    /// Unique identifier for the project (UUID v4 as string)
    id: String,

    /// Identifier of the tenant that owns the project
    owner_id: String,

    /// Human readable name of the project
    name: String,

    /// Kind of construction work, used as context for categorization
    project_type: Option<String>,

    /// When this project was created
    created_at: NaiveDateTime,

    /// When this project was last updated
    updated_at: NaiveDateTime,
}

impl Project {
    /// Creates a new project
    ///
    /// This method automatically generates a UUID v4 for the ID and sets
    /// the created_at and updated_at timestamps to the current time.
    ///
    /// ### Arguments
    ///
    /// * `owner_id` - The tenant owning the project
    /// * `name` - The name of the project
    /// * `project_type` - Optional kind of work (e.g. "Villa", "Warehouse")
    ///
    /// ### Returns
    ///
    /// A new `Project` instance
    pub fn new(owner_id: String, name: String, project_type: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            name,
            project_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the project's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the tenant owning the project
    pub fn get_owner_id(&self) -> String {
        self.owner_id.clone()
    }

    /// Gets the project's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    /// Sets the project's name
    ///
    /// ### Arguments
    ///
    /// * `name` - The new name for the project
    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Gets the project's type
    pub fn get_project_type(&self) -> Option<String> {
        self.project_type.clone()
    }

    /// Gets the project's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the project's last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
