use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// The editable fields of a material
///
/// Used both to create a material and as the body of create requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MaterialDraft {
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
    pub weight: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub specs: Option<serde_json::Value>,
}

/// A line of a project's material list
///
/// Maps to the `materials` table. `specs` holds free-form technical
/// attributes (dimensions, grade, image URLs) as JSON text.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::materials)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Material {
    id: String,
    project_id: String,
    name: String,
    description: Option<String>,
    category: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    weight: Option<f64>,
    volume: Option<f64>,
    specs: JsonValue,
    created_at: NaiveDateTime,
}

impl Material {
    /// Creates a new material belonging to `project_id`
    pub fn new(project_id: String, draft: MaterialDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            quantity: draft.quantity,
            unit: draft.unit,
            weight: draft.weight,
            volume: draft.volume,
            specs: JsonValue(draft.specs.unwrap_or_else(|| serde_json::json!({}))),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_project_id(&self) -> String {
        self.project_id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    /// The name used to match supplier lines back to this material:
    /// trimmed and lowercased
    pub fn normalized_name(&self) -> String {
        normalize_material_name(&self.name)
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_category(&self) -> Option<String> {
        self.category.clone()
    }

    pub fn get_quantity(&self) -> Option<f64> {
        self.quantity
    }

    pub fn get_unit(&self) -> Option<String> {
        self.unit.clone()
    }

    pub fn get_weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn get_volume(&self) -> Option<f64> {
        self.volume
    }

    pub fn get_specs(&self) -> serde_json::Value {
        self.specs.0.clone()
    }

    /// Image URLs stored under `specs.images`, if any
    pub fn get_images(&self) -> Vec<String> {
        self.specs
            .0
            .get("images")
            .and_then(|v| v.as_array())
            .map(|images| {
                images
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// Trims and lowercases a material name for matching
pub fn normalize_material_name(name: &str) -> String {
    name.trim().to_lowercase()
}
