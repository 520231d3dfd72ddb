use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query as MultiQuery;
use chrono::Utc;
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::AppState;
use crate::db::DbPool;
use crate::dto::{
    ComparisonQuery, CreateQuotationsDto, Listing, QuotationListQuery, QuotationPage,
    UpdateQuotationDto,
};
use crate::errors::ApiError;
use crate::export::{comparisons_to_csv, export_filename};
use crate::models::MaterialQuotation;
use crate::pricing::{
    MaterialComparison, QuotationStats, SupplierSummary, build_comparisons, filter_and_sort,
    group_by_supplier, quotation_stats,
};
use crate::repo;

/// Handler for browsing the quotation archive
///
/// This function handles GET requests to `/quotations`. The query accepts
/// `material`, `supplier`, `category`, `status`, `sort_by`, `sort_order`,
/// `limit`, `offset` and a repeatable `country`.
///
/// ### Returns
///
/// One window of matching quotations, the total match count and the values
/// available to filter with
#[instrument(skip(pool, query), fields(query = %query))]
pub async fn list_quotations_handler(
    State(pool): State<Arc<DbPool>>,
    MultiQuery(query): MultiQuery<QuotationListQuery>,
) -> Result<Json<QuotationPage<MaterialQuotation>>, ApiError> {
    let (data, total) = repo::list_quotations(&pool, &query)?;
    let filters = repo::quotation_filter_options(&pool)?;

    Ok(Json(QuotationPage {
        data,
        total,
        limit: query.limit(),
        offset: query.offset(),
        filters,
    }))
}

fn comparisons(pool: &DbPool, query: &ComparisonQuery) -> Result<Vec<MaterialComparison>, ApiError> {
    let quotations = repo::list_active_quotations(pool)?;
    let comparisons = filter_and_sort(build_comparisons(&quotations), query);
    debug!("Built {} comparisons from {} quotations", comparisons.len(), quotations.len());
    Ok(comparisons)
}

/// Handler comparing prices of each material across suppliers
///
/// This function handles GET requests to `/quotations/comparison`.
#[instrument(skip(pool))]
pub async fn quotation_comparison_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Json<Listing<MaterialComparison>>, ApiError> {
    Ok(Json(comparisons(&pool, &query)?.into()))
}

/// Handler downloading the comparison view as CSV
///
/// This function handles GET requests to `/quotations/export`, with the
/// same filters as the comparison view.
#[instrument(skip(pool))]
pub async fn export_comparison_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Response, ApiError> {
    let rows = comparisons(&pool, &query)?;
    let csv = comparisons_to_csv(&rows);
    let filename = export_filename(Utc::now().date_naive());

    info!("Exporting {} comparison rows as {}", rows.len(), filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Handler grouping the archive by supplier, busiest first
#[instrument(skip(pool))]
pub async fn quotations_by_supplier_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Listing<SupplierSummary>>, ApiError> {
    let quotations = repo::list_active_quotations(&pool)?;
    Ok(Json(group_by_supplier(&quotations).into()))
}

#[instrument(skip(pool))]
pub async fn quotation_stats_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<QuotationStats>, ApiError> {
    let quotations = repo::list_active_quotations(&pool)?;
    Ok(Json(quotation_stats(&quotations, Utc::now())))
}

/// Handler archiving quotations typed in by an administrator
///
/// This function handles POST requests to `/quotations`.
#[instrument(skip(state, payload), fields(count = payload.quotations.len()))]
pub async fn create_quotations_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuotationsDto>,
) -> Result<Json<Vec<MaterialQuotation>>, ApiError> {
    if payload.quotations.is_empty() {
        return Err(ApiError::Validation("No quotations provided".to_string()));
    }
    for draft in &payload.quotations {
        if draft.material_name.trim().is_empty() {
            return Err(ApiError::Validation("Every quotation needs a material name".to_string()));
        }
        if !draft.unit_price.is_finite() || draft.unit_price < 0.0 {
            return Err(ApiError::Validation(format!("Invalid unit price for {}", draft.material_name)));
        }
        if draft.supplier_email.trim().is_empty() && payload.supplier.is_none() {
            return Err(ApiError::Validation("Every quotation needs a supplier email".to_string()));
        }
    }

    let created = repo::create_quotations(&state.pool, payload, state.config.fallback_exchange_rate)?;
    Ok(Json(created))
}

/// Handler changing the status or notes of an archived quotation
///
/// This function handles PATCH requests to `/quotations/{id}`.
#[instrument(skip(pool, payload))]
pub async fn update_quotation_handler(
    State(pool): State<Arc<DbPool>>,
    Path(quotation_id): Path<String>,
    Json(payload): Json<UpdateQuotationDto>,
) -> Result<Json<MaterialQuotation>, ApiError> {
    let quotation = repo::update_quotation(&pool, &quotation_id, payload)?
        .ok_or(ApiError::NotFound("Quotation"))?;

    Ok(Json(quotation))
}

#[instrument(skip(pool))]
pub async fn get_quotation_handler(
    State(pool): State<Arc<DbPool>>,
    Path(quotation_id): Path<String>,
) -> Result<Json<MaterialQuotation>, ApiError> {
    let quotation = repo::get_quotation(&pool, &quotation_id)?
        .ok_or(ApiError::NotFound("Quotation"))?;

    Ok(Json(quotation))
}
