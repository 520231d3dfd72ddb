use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::db::DbPool;
use crate::dto::{CreateProjectDto, Paginated, ProjectComparisonQuery, ProjectListQuery, UpdateProjectDto};
use crate::errors::ApiError;
use crate::models::{Price, Project};
use crate::pricing::{ProjectComparison, project_comparison};
use crate::repo;

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Project name cannot be empty".to_string()));
    }
    Ok(())
}

/// Handler for creating a new project
///
/// This function handles POST requests to `/projects`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The owner, name and optional type of the project
///
/// ### Returns
///
/// The newly created project as JSON
#[instrument(skip(pool, payload), fields(owner_id = %payload.owner_id))]
pub async fn create_project_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateProjectDto>,
) -> Result<Json<Project>, ApiError> {
    require_name(&payload.name)?;

    let project = repo::create_project(&pool, payload.owner_id, payload.name, payload.project_type)?;

    info!("Created project {}", project.get_id());
    Ok(Json(project))
}

/// Handler for retrieving a specific project
///
/// This function handles GET requests to `/projects/{id}`.
#[instrument(skip(pool))]
pub async fn get_project_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    Ok(Json(project))
}

/// Handler for listing the projects of an owner
///
/// This function handles GET requests to `/projects?owner_id=...&page=...&limit=...`.
///
/// ### Returns
///
/// One page of projects, most recently updated first
#[instrument(skip(pool))]
pub async fn list_projects_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Paginated<Project>>, ApiError> {
    let page = query.page_query();
    let (projects, total) = repo::list_projects(&pool, &query.owner_id, &page)?;

    debug!("Returning {} of {} projects", projects.len(), total);
    Ok(Json(Paginated::new(projects, total, &page)))
}

/// Handler for renaming or retyping a project
///
/// This function handles PATCH requests to `/projects/{id}`.
#[instrument(skip(pool, payload))]
pub async fn update_project_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Json(payload): Json<UpdateProjectDto>,
) -> Result<Json<Project>, ApiError> {
    if let Some(name) = &payload.name {
        require_name(name)?;
    }

    let project = repo::update_project(&pool, &project_id, payload)?
        .ok_or(ApiError::NotFound("Project"))?;

    Ok(Json(project))
}

/// Handler for deleting a project along with its materials, prices,
/// requests and collaborators
///
/// This function handles DELETE requests to `/projects/{id}`.
#[instrument(skip(pool))]
pub async fn delete_project_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    if !repo::delete_project(&pool, &project_id)? {
        return Err(ApiError::NotFound("Project"));
    }

    info!("Deleted project {}", project_id);
    Ok(Json(()))
}

/// Handler for listing every price recorded on a project's materials
#[instrument(skip(pool))]
pub async fn list_project_prices_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Price>>, ApiError> {
    repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    Ok(Json(repo::list_project_prices(&pool, &project_id)?))
}

/// Handler comparing what a project costs per sourcing country
///
/// This function handles GET requests to
/// `/projects/{id}/comparison?baseline=...&candidate=...`. Savings are only
/// computed when both countries are given.
#[instrument(skip(pool))]
pub async fn project_comparison_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Query(query): Query<ProjectComparisonQuery>,
) -> Result<Json<ProjectComparison>, ApiError> {
    repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    let materials = repo::list_materials(&pool, &project_id)?;
    let prices = repo::list_project_prices(&pool, &project_id)?;

    let comparison = project_comparison(
        &materials,
        &prices,
        query.baseline.as_deref(),
        query.candidate.as_deref(),
    );
    Ok(Json(comparison))
}
