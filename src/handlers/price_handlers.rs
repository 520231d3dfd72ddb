use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::AppState;
use crate::db::DbPool;
use crate::dto::CreatePriceDto;
use crate::errors::ApiError;
use crate::models::Price;
use crate::pricing::SETTLEMENT_CURRENCY;
use crate::repo;

/// Handler for recording a price against a material
///
/// This function handles POST requests to `/materials/{id}/prices`.
///
/// When the price carries no converted amount, one is computed from the
/// stored exchange rates, or from the configured fallback rate when the
/// currency has no stored rate to FCFA.
///
/// ### Returns
///
/// The stored price as JSON
#[instrument(skip(state, payload), fields(amount = payload.amount, currency = %payload.currency))]
pub async fn add_price_handler(
    State(state): State<AppState>,
    Path(material_id): Path<String>,
    Json(mut payload): Json<CreatePriceDto>,
) -> Result<Json<Price>, ApiError> {
    if !payload.amount.is_finite() || payload.amount < 0.0 {
        return Err(ApiError::Validation("Price amount must be a positive number".to_string()));
    }
    if payload.currency.trim().is_empty() {
        return Err(ApiError::Validation("Price currency is required".to_string()));
    }

    repo::get_material(&state.pool, &material_id)?
        .ok_or(ApiError::NotFound("Material"))?;

    if payload.converted_amount.is_none() {
        let rates = repo::rate_table(&state.pool);
        let converted = rates.convert_or_fallback(
            payload.amount,
            &payload.currency,
            SETTLEMENT_CURRENCY,
            state.config.fallback_exchange_rate,
        );
        debug!("Converted {} {} to {} {}", payload.amount, payload.currency, converted, SETTLEMENT_CURRENCY);
        payload.converted_amount = Some(converted);
    }

    let price = repo::add_price(&state.pool, &material_id, payload)?;

    info!("Recorded price {}", price.get_id());
    Ok(Json(price))
}

/// Handler for listing the prices of a material, cheapest first
///
/// This function handles GET requests to `/materials/{id}/prices`.
#[instrument(skip(pool))]
pub async fn list_prices_handler(
    State(pool): State<Arc<DbPool>>,
    Path(material_id): Path<String>,
) -> Result<Json<Vec<Price>>, ApiError> {
    repo::get_material(&pool, &material_id)?
        .ok_or(ApiError::NotFound("Material"))?;

    Ok(Json(repo::list_prices(&pool, &material_id)?))
}
