use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::db::DbPool;
use crate::dto::CreateSupplierDto;
use crate::errors::ApiError;
use crate::models::Supplier;
use crate::repo;

/// Handler for registering a supplier
///
/// This function handles POST requests to `/suppliers`.
#[instrument(skip(pool, payload), fields(name = %payload.name))]
pub async fn create_supplier_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateSupplierDto>,
) -> Result<Json<Supplier>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Supplier name cannot be empty".to_string()));
    }

    let supplier = repo::create_supplier(
        &pool,
        payload.name.trim().to_string(),
        payload.email,
        payload.country,
        payload.contact_info,
    )?;

    info!("Created supplier {}", supplier.get_id());
    Ok(Json(supplier))
}

/// Handler for listing suppliers by name
#[instrument(skip(pool))]
pub async fn list_suppliers_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    Ok(Json(repo::list_suppliers(&pool)?))
}

#[instrument(skip(pool))]
pub async fn get_supplier_handler(
    State(pool): State<Arc<DbPool>>,
    Path(supplier_id): Path<String>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = repo::get_supplier(&pool, &supplier_id)?
        .ok_or(ApiError::NotFound("Supplier"))?;

    Ok(Json(supplier))
}
