use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::AppState;
use crate::db::DbPool;
use crate::dto::{QuoteListQuery, SendQuoteDto, UpdateMarginDto};
use crate::errors::ApiError;
use crate::models::SupplierQuote;
use crate::pricing::{SendSummary, validate_margin};
use crate::repo::{self, BrokerSettings};

/// Handler for listing supplier quotes, newest first
///
/// This function handles GET requests to `/quotes`, optionally narrowed to
/// one request with `?request_id=...`.
#[instrument(skip(pool))]
pub async fn list_quotes_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<Vec<SupplierQuote>>, ApiError> {
    Ok(Json(repo::list_quotes(&pool, query.request_id.as_deref())?))
}

#[instrument(skip(pool))]
pub async fn get_quote_handler(
    State(pool): State<Arc<DbPool>>,
    Path(quote_id): Path<String>,
) -> Result<Json<SupplierQuote>, ApiError> {
    let quote = repo::get_quote(&pool, &quote_id)?
        .ok_or(ApiError::NotFound("Quote"))?;

    Ok(Json(quote))
}

/// Handler storing the margin planned for a quote
///
/// This function handles PATCH requests to `/quotes/{id}/margin`.
#[instrument(skip(pool, payload), fields(margin = payload.admin_margin))]
pub async fn update_quote_margin_handler(
    State(pool): State<Arc<DbPool>>,
    Path(quote_id): Path<String>,
    Json(payload): Json<UpdateMarginDto>,
) -> Result<Json<SupplierQuote>, ApiError> {
    validate_margin(payload.admin_margin).map_err(ApiError::Validation)?;

    let quote = repo::update_quote_margin(&pool, &quote_id, payload.admin_margin)?
        .ok_or(ApiError::NotFound("Quote"))?;

    Ok(Json(quote))
}

/// Handler forwarding a supplier quote to the client
///
/// This function handles POST requests to `/quotes/{id}/send`.
///
/// ### Arguments
///
/// * `state` - Application state, for the pool and the brokerage settings
/// * `quote_id` - The quote to forward
/// * `payload` - The global margin, optional per-line margins and whether
///   the global margin overrides them
///
/// ### Returns
///
/// What the brokerage wrote: prices, archived quotations and the
/// notification sent to the owner. A quote that was already sent is a 409.
#[instrument(skip(state, payload))]
pub async fn send_quote_handler(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
    Json(payload): Json<SendQuoteDto>,
) -> Result<Json<SendSummary>, ApiError> {
    let policy = payload.into_policy();
    policy.validate().map_err(ApiError::Validation)?;

    let settings = BrokerSettings {
        broker_supplier_name: state.config.broker_supplier_name.clone(),
        fallback_rate: state.config.fallback_exchange_rate,
    };

    let summary = repo::send_quote_to_client(&state.pool, &quote_id, &policy, &settings)?
        .ok_or(ApiError::NotFound("Quote"))?;

    info!(
        "Quote {} sent: {} prices for {} materials",
        summary.quote_id, summary.prices_inserted, summary.material_count
    );
    Ok(Json(summary))
}
