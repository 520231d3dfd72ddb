use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::AppState;
use crate::db::DbPool;
use crate::dto::{ConversionDto, ConvertQuery, UpsertExchangeRateDto};
use crate::errors::ApiError;
use crate::models::ExchangeRate;
use crate::pricing::normalize_currency;
use crate::repo;

fn require_currency(code: &str) -> Result<(), ApiError> {
    if code.trim().is_empty() {
        return Err(ApiError::Validation("Currency code cannot be empty".to_string()));
    }
    Ok(())
}

/// Handler for storing the rate of a currency pair
///
/// This function handles POST requests to `/exchange-rates`. A rate already
/// stored for the pair is replaced.
#[instrument(skip(pool))]
pub async fn upsert_exchange_rate_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<UpsertExchangeRateDto>,
) -> Result<Json<ExchangeRate>, ApiError> {
    require_currency(&payload.from_currency)?;
    require_currency(&payload.to_currency)?;
    if !payload.rate.is_finite() || payload.rate <= 0.0 {
        return Err(ApiError::Validation("Exchange rate must be greater than zero".to_string()));
    }

    let rate = repo::upsert_exchange_rate(&pool, &payload.from_currency, &payload.to_currency, payload.rate)?;

    info!(
        "Stored rate {} -> {} = {}",
        rate.get_from_currency(),
        rate.get_to_currency(),
        rate.get_rate()
    );
    Ok(Json(rate))
}

/// Handler for listing every stored rate
#[instrument(skip(pool))]
pub async fn list_exchange_rates_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<ExchangeRate>>, ApiError> {
    Ok(Json(repo::list_exchange_rates(&pool)?))
}

#[instrument(skip(pool))]
pub async fn delete_exchange_rate_handler(
    State(pool): State<Arc<DbPool>>,
    Path(rate_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    if !repo::delete_exchange_rate(&pool, &rate_id)? {
        return Err(ApiError::NotFound("Exchange rate"));
    }
    Ok(Json(()))
}

/// Handler converting an amount between two currencies
///
/// This function handles GET requests to
/// `/exchange-rates/convert?amount=...&from=...&to=...` (`to` defaults to
/// FCFA). A pair with no stored rate in either direction is converted with
/// the configured fallback rate, and the response says so.
#[instrument(skip(state))]
pub async fn convert_currency_handler(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConversionDto>, ApiError> {
    require_currency(&query.from)?;
    require_currency(&query.to)?;
    if !query.amount.is_finite() {
        return Err(ApiError::Validation("Amount must be a finite number".to_string()));
    }

    let rates = repo::rate_table(&state.pool);
    let fallback = state.config.fallback_exchange_rate;
    let known = rates.convert(1.0, &query.from, &query.to);

    Ok(Json(ConversionDto {
        amount: query.amount,
        from: normalize_currency(&query.from),
        to: normalize_currency(&query.to),
        rate: known.unwrap_or(fallback),
        converted: rates.convert_or_fallback(query.amount, &query.from, &query.to, fallback),
        fallback_used: known.is_none(),
    }))
}
