use crate::db::DbPool;
use crate::dto::UpdateMaterialDto;
use crate::models::{JsonValue, Material, MaterialDraft};
use crate::schema::materials;
use anyhow::Result;
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// The columns a partial material update may touch; `None` leaves a column as is
#[derive(AsChangeset, Default)]
#[diesel(table_name = materials)]
struct MaterialChanges {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    weight: Option<f64>,
    volume: Option<f64>,
    specs: Option<JsonValue>,
}

impl From<UpdateMaterialDto> for MaterialChanges {
    fn from(update: UpdateMaterialDto) -> Self {
        Self {
            name: update.name,
            description: update.description,
            category: update.category,
            quantity: update.quantity,
            unit: update.unit,
            weight: update.weight,
            volume: update.volume,
            specs: update.specs.map(JsonValue),
        }
    }
}

impl MaterialChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.weight.is_none()
            && self.volume.is_none()
            && self.specs.is_none()
    }
}

/// Adds a material to a project
///
/// ### Errors
///
/// Returns an error if the project does not exist (foreign key violation)
/// or the insert fails
#[instrument(skip(pool, draft), fields(name = %draft.name))]
pub fn create_material(pool: &DbPool, project_id: &str, draft: MaterialDraft) -> Result<Material> {
    let conn = &mut pool.get()?;

    let new_material = Material::new(project_id.to_string(), draft);

    diesel::insert_into(materials::table)
        .values(&new_material)
        .execute(conn)?;

    Ok(new_material)
}

#[instrument(skip(pool))]
pub fn get_material(pool: &DbPool, material_id: &str) -> Result<Option<Material>> {
    let conn = &mut pool.get()?;

    let result = materials::table
        .find(material_id)
        .first::<Material>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the materials of a project in creation order
#[instrument(skip(pool))]
pub fn list_materials(pool: &DbPool, project_id: &str) -> Result<Vec<Material>> {
    let conn = &mut pool.get()?;

    let result = materials::table
        .filter(materials::project_id.eq(project_id))
        .order((materials::created_at.asc(), materials::id.asc()))
        .load::<Material>(conn)?;

    Ok(result)
}

/// Applies a partial update to a material
///
/// ### Returns
///
/// The updated material, or None if it does not exist
#[instrument(skip(pool, update))]
pub fn update_material(pool: &DbPool, material_id: &str, update: UpdateMaterialDto) -> Result<Option<Material>> {
    let conn = &mut pool.get()?;

    let changes = MaterialChanges::from(update);
    if !changes.is_empty() {
        diesel::update(materials::table.find(material_id))
            .set(&changes)
            .execute(conn)?;
    }

    let result = materials::table
        .find(material_id)
        .first::<Material>(conn)
        .optional()?;

    Ok(result)
}

#[instrument(skip(pool))]
pub fn delete_material(pool: &DbPool, material_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(materials::table.find(material_id)).execute(conn)?;

    Ok(deleted > 0)
}

/// Writes the category of many materials of one project
///
/// Entries naming a material outside `project_id` are ignored.
///
/// ### Returns
///
/// The number of materials updated
#[instrument(skip(pool, category_map), fields(entries = category_map.len()))]
pub fn assign_categories(
    pool: &DbPool,
    project_id: &str,
    category_map: &HashMap<String, String>,
) -> Result<usize> {
    let conn = &mut pool.get()?;

    let updated = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let mut updated = 0;
        for (material_id, category) in category_map {
            updated += diesel::update(
                materials::table
                    .filter(materials::id.eq(material_id))
                    .filter(materials::project_id.eq(project_id)),
            )
            .set(materials::category.eq(Some(category)))
            .execute(conn)?;
        }
        Ok(updated)
    })?;

    debug!(updated, "Assigned material categories");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_material, seed_project, setup_test_db};
    use serde_json::json;

    #[test]
    fn test_create_and_list_materials() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");

        let first = seed_material(&pool, &project.get_id(), "Ciment", Some(100.0));
        let second = seed_material(&pool, &project.get_id(), "Sable", None);

        let materials = list_materials(&pool, &project.get_id()).unwrap();
        assert_eq!(materials.len(), 2);
        assert!(materials.iter().any(|m| m.get_id() == first.get_id()));
        assert!(materials.iter().any(|m| m.get_id() == second.get_id()));
    }

    #[test]
    fn test_create_material_in_missing_project_fails() {
        let pool = setup_test_db();
        let result = create_material(
            &pool,
            "missing",
            MaterialDraft {
                name: "Ciment".to_string(),
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_material_partial() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        let material = seed_material(&pool, &project.get_id(), "Ciment", Some(100.0));

        let updated = update_material(
            &pool,
            &material.get_id(),
            UpdateMaterialDto {
                quantity: Some(150.0),
                specs: Some(json!({"grade": "42.5"})),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.get_name(), "Ciment");
        assert_eq!(updated.get_quantity(), Some(150.0));
        assert_eq!(updated.get_specs(), json!({"grade": "42.5"}));
    }

    #[test]
    fn test_empty_update_returns_material() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        let material = seed_material(&pool, &project.get_id(), "Ciment", None);

        let same = update_material(&pool, &material.get_id(), UpdateMaterialDto::default())
            .unwrap()
            .unwrap();
        assert_eq!(same.get_id(), material.get_id());
        assert_eq!(same.get_name(), "Ciment");

        assert!(update_material(&pool, "missing", UpdateMaterialDto::default()).unwrap().is_none());
    }

    #[test]
    fn test_delete_material() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        let material = seed_material(&pool, &project.get_id(), "Ciment", None);

        assert!(delete_material(&pool, &material.get_id()).unwrap());
        assert!(get_material(&pool, &material.get_id()).unwrap().is_none());
        assert!(!delete_material(&pool, &material.get_id()).unwrap());
    }

    #[test]
    fn test_assign_categories_stays_in_project() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        let other = seed_project(&pool, "owner-2", "Other");
        let cement = seed_material(&pool, &project.get_id(), "Ciment", None);
        let tiles = seed_material(&pool, &project.get_id(), "Carrelage", None);
        let foreign = seed_material(&pool, &other.get_id(), "Peinture", None);

        let map = HashMap::from([
            (cement.get_id(), "Gros Œuvre".to_string()),
            (tiles.get_id(), "Carrelage et Revêtements".to_string()),
            (foreign.get_id(), "Peinture".to_string()),
        ]);

        let updated = assign_categories(&pool, &project.get_id(), &map).unwrap();

        assert_eq!(updated, 2);
        let cement = get_material(&pool, &cement.get_id()).unwrap().unwrap();
        assert_eq!(cement.get_category(), Some("Gros Œuvre".to_string()));
        let foreign = get_material(&pool, &foreign.get_id()).unwrap().unwrap();
        assert!(foreign.get_category().is_none());
    }
}
