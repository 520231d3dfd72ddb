use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::db::DbPool;
use crate::dto::{AssignCategoriesDto, CreateMaterialDto, UpdateMaterialDto, UpdatedCount};
use crate::errors::ApiError;
use crate::models::Material;
use crate::repo;

fn check_quantities(quantity: Option<f64>, weight: Option<f64>, volume: Option<f64>) -> Result<(), ApiError> {
    for (label, value) in [("quantity", quantity), ("weight", weight), ("volume", volume)] {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(ApiError::Validation(format!("Material {} must be a positive number", label)));
            }
        }
    }
    Ok(())
}

/// Handler for adding a material to a project
///
/// This function handles POST requests to `/projects/{id}/materials`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `project_id` - The project receiving the material
/// * `payload` - Name, quantity, unit and other attributes of the material
///
/// ### Returns
///
/// The created material as JSON
#[instrument(skip(pool, payload), fields(name = %payload.name))]
pub async fn create_material_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateMaterialDto>,
) -> Result<Json<Material>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Material name cannot be empty".to_string()));
    }
    check_quantities(payload.quantity, payload.weight, payload.volume)?;

    repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    let material = repo::create_material(&pool, &project_id, payload)?;

    info!("Created material {}", material.get_id());
    Ok(Json(material))
}

/// Handler for listing the materials of a project
///
/// This function handles GET requests to `/projects/{id}/materials`.
#[instrument(skip(pool))]
pub async fn list_materials_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Material>>, ApiError> {
    repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    Ok(Json(repo::list_materials(&pool, &project_id)?))
}

#[instrument(skip(pool))]
pub async fn get_material_handler(
    State(pool): State<Arc<DbPool>>,
    Path(material_id): Path<String>,
) -> Result<Json<Material>, ApiError> {
    let material = repo::get_material(&pool, &material_id)?
        .ok_or(ApiError::NotFound("Material"))?;

    Ok(Json(material))
}

/// Handler for a partial update of a material
///
/// This function handles PATCH requests to `/materials/{id}`.
#[instrument(skip(pool, payload))]
pub async fn update_material_handler(
    State(pool): State<Arc<DbPool>>,
    Path(material_id): Path<String>,
    Json(payload): Json<UpdateMaterialDto>,
) -> Result<Json<Material>, ApiError> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::Validation("Material name cannot be empty".to_string()));
    }
    check_quantities(payload.quantity, payload.weight, payload.volume)?;

    let material = repo::update_material(&pool, &material_id, payload)?
        .ok_or(ApiError::NotFound("Material"))?;

    Ok(Json(material))
}

/// Handler for deleting a material and its prices and comments
///
/// This function handles DELETE requests to `/materials/{id}`.
#[instrument(skip(pool))]
pub async fn delete_material_handler(
    State(pool): State<Arc<DbPool>>,
    Path(material_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    if !repo::delete_material(&pool, &material_id)? {
        return Err(ApiError::NotFound("Material"));
    }

    info!("Deleted material {}", material_id);
    Ok(Json(()))
}

/// Handler writing categories onto many materials of a project at once
///
/// This function handles PUT requests to `/projects/{id}/materials/categories`.
/// Ids that are not materials of the project are skipped.
///
/// ### Returns
///
/// How many materials were updated
#[instrument(skip(pool, payload), fields(count = payload.category_map.len()))]
pub async fn assign_categories_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Json(payload): Json<AssignCategoriesDto>,
) -> Result<Json<UpdatedCount>, ApiError> {
    repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    let updated = repo::assign_categories(&pool, &project_id, &payload.category_map)?;

    info!("Categorized {} materials", updated);
    Ok(Json(UpdatedCount { updated }))
}
