use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use crate::db::DbPool;
use crate::dto::{
    AddLinksDto, CreateSupplierRequestDto, Listing, PublicRequestView, RequestListQuery,
    SubmitQuoteDto, SyncStatus, SyncSummary, UpdateRequestStatusDto,
};
use crate::errors::ApiError;
use crate::models::{
    MAX_EXPIRY_DAYS, MAX_LINKS_PER_BATCH, RequestStatus, SupplierQuote, SupplierRequest,
    SupplierToken,
};
use crate::repo;

/// Handler for sending a project out for quotation
///
/// This function handles POST requests to `/projects/{id}/supplier-requests`.
/// The project's current materials are snapshotted into the request.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `project_id` - The project to quote
/// * `payload` - The requesting owner and the request options
///
/// ### Returns
///
/// The created request, with its request number and public token
#[instrument(skip(pool, payload), fields(owner_id = %payload.owner_id))]
pub async fn create_supplier_request_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateSupplierRequestDto>,
) -> Result<Json<SupplierRequest>, ApiError> {
    let options = payload.options();
    check_link_count(options.num_suppliers)?;
    if options.expires_in_days.is_some_and(|days| days < 1) {
        return Err(ApiError::Validation("Expiry must be at least one day away".to_string()));
    }
    if options.expires_in_days.is_some_and(|days| days > MAX_EXPIRY_DAYS) {
        return Err(ApiError::Validation(format!(
            "Expiry cannot be more than {MAX_EXPIRY_DAYS} days away"
        )));
    }

    let project = repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;
    if project.get_owner_id() != payload.owner_id {
        // Scoped by owner: another tenant's project looks absent
        return Err(ApiError::NotFound("Project"));
    }

    let request = repo::create_supplier_request(&pool, &project, &payload.owner_id, options)?;

    info!("Created request {}", request.get_request_number());
    Ok(Json(request))
}

/// Handler for listing requests for quotation, newest first
///
/// This function handles GET requests to `/supplier-requests`, optionally
/// narrowed with `?owner_id=...`.
#[instrument(skip(pool))]
pub async fn list_supplier_requests_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Vec<SupplierRequest>>, ApiError> {
    let requests = repo::list_supplier_requests(&pool, query.owner_id.as_deref())?;
    debug!("Found {} requests", requests.len());
    Ok(Json(requests))
}

#[instrument(skip(pool))]
pub async fn get_supplier_request_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
) -> Result<Json<SupplierRequest>, ApiError> {
    let request = repo::get_supplier_request(&pool, &request_id)?
        .ok_or(ApiError::NotFound("Supplier request"))?;

    Ok(Json(request))
}

/// Handler moving a request to another lifecycle status
///
/// This function handles PATCH requests to `/supplier-requests/{id}/status`.
#[instrument(skip(pool, payload), fields(status = %payload.status))]
pub async fn update_request_status_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
    Json(payload): Json<UpdateRequestStatusDto>,
) -> Result<Json<SupplierRequest>, ApiError> {
    let request = repo::update_request_status(&pool, &request_id, payload.status)?
        .ok_or(ApiError::NotFound("Supplier request"))?;

    info!("Request {} is now {}", request.get_request_number(), payload.status);
    Ok(Json(request))
}

fn check_link_count(count: i32) -> Result<(), ApiError> {
    if count < 1 {
        return Err(ApiError::Validation("At least one supplier must be requested".to_string()));
    }
    if count > MAX_LINKS_PER_BATCH {
        return Err(ApiError::Validation(format!(
            "No more than {MAX_LINKS_PER_BATCH} supplier links at a time"
        )));
    }
    Ok(())
}

/// Resolves a public token and checks the request still accepts answers
///
/// The token is either a supplier's personal link or the shared link of the
/// request itself.
fn open_request(pool: &DbPool, token: &str) -> Result<(SupplierRequest, Option<SupplierToken>), ApiError> {
    let now = Utc::now();
    let (request, link) = match repo::get_link_by_token(pool, token)? {
        Some(link) => {
            if link.is_expired(now) {
                return Err(ApiError::Gone("This supplier link has expired".to_string()));
            }
            let request = repo::get_supplier_request(pool, &link.get_supplier_request_id())?
                .ok_or(ApiError::NotFound("Supplier request"))?;
            (request, Some(link))
        }
        None => {
            let request = repo::get_request_by_token(pool, token)?
                .ok_or(ApiError::NotFound("Supplier request"))?;
            (request, None)
        }
    };

    if request.is_expired(now) {
        warn!("Request {} has expired", request.get_request_number());
        return Err(ApiError::Gone("This request for quotation has expired".to_string()));
    }
    if request.get_status() == RequestStatus::Cancelled.as_str() {
        return Err(ApiError::Gone("This request for quotation was cancelled".to_string()));
    }
    Ok((request, link))
}

/// Handler for the supplier-facing view of a request
///
/// This function handles GET requests to `/public/requests/{token}`.
///
/// Opening a supplier's personal link counts as a view of that link.
///
/// ### Returns
///
/// The materials to quote, or 410 Gone once the request has expired
#[instrument(skip(pool, token))]
pub async fn get_public_request_handler(
    State(pool): State<Arc<DbPool>>,
    Path(token): Path<String>,
) -> Result<Json<PublicRequestView>, ApiError> {
    let (request, link) = open_request(&pool, &token)?;

    let view = match link {
        Some(link) => {
            let link = repo::record_link_view(&pool, &link.get_id())?
                .ok_or(ApiError::NotFound("Supplier link"))?;
            PublicRequestView::for_link(&request, &link)
        }
        None => PublicRequestView::from(&request),
    };
    Ok(Json(view))
}

/// Handler for a supplier answering a request through its public link
///
/// This function handles POST requests to `/public/requests/{token}/quotes`.
/// Answering again with the same email replaces the previous answer.
#[instrument(skip(pool, token, payload), fields(email = %payload.supplier.email))]
pub async fn submit_quote_handler(
    State(pool): State<Arc<DbPool>>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitQuoteDto>,
) -> Result<Json<SupplierQuote>, ApiError> {
    let supplier = &payload.supplier;
    if supplier.name.trim().is_empty() {
        return Err(ApiError::Validation("Supplier name is required".to_string()));
    }
    if !supplier.email.contains('@') {
        return Err(ApiError::Validation("A valid supplier email is required".to_string()));
    }
    if payload.quoted_materials.is_empty() {
        return Err(ApiError::Validation("At least one material must be quoted".to_string()));
    }
    for line in &payload.quoted_materials {
        if line.prices.iter().any(|p| !p.amount.is_finite() || p.amount < 0.0) {
            return Err(ApiError::Validation(format!("Invalid price for {}", line.name)));
        }
    }

    let (request, link) = open_request(&pool, &token)?;

    let quote = match link {
        Some(link) => repo::submit_quote_via_link(&pool, &request, &link, payload.supplier, payload.quoted_materials)?,
        None => repo::submit_quote(&pool, &request, payload.supplier, payload.quoted_materials)?,
    };

    info!("Quote {} submitted for {}", quote.get_id(), request.get_request_number());
    Ok(Json(quote))
}

/// Handler listing the personal links of a request
///
/// This function handles GET requests to `/supplier-requests/{id}/tokens`.
#[instrument(skip(pool))]
pub async fn list_supplier_tokens_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
) -> Result<Json<Listing<SupplierToken>>, ApiError> {
    repo::get_supplier_request(&pool, &request_id)?
        .ok_or(ApiError::NotFound("Supplier request"))?;

    let links = repo::list_supplier_tokens(&pool, &request_id)?;
    Ok(Json(Listing::from(links)))
}

/// Handler handing out more personal links on a request
///
/// This function handles POST requests to `/supplier-requests/{id}/tokens`.
/// The body's `count` defaults to one.
///
/// ### Returns
///
/// Only the newly created links
#[instrument(skip(pool, payload))]
pub async fn add_supplier_tokens_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
    Json(payload): Json<AddLinksDto>,
) -> Result<Json<Listing<SupplierToken>>, ApiError> {
    let count = payload.count();
    check_link_count(count)?;

    let request = repo::get_supplier_request(&pool, &request_id)?
        .ok_or(ApiError::NotFound("Supplier request"))?;
    if request.get_status() == RequestStatus::Cancelled.as_str() {
        return Err(ApiError::Conflict("Cannot add links to a cancelled request".to_string()));
    }

    let links = repo::add_supplier_tokens(&pool, &request, count)?;

    info!("Added {} links to {}", links.len(), request.get_request_number());
    Ok(Json(Listing::from(links)))
}

/// Handler revoking one personal link
///
/// This function handles DELETE requests to
/// `/supplier-requests/{id}/tokens/{token_id}`.
#[instrument(skip(pool))]
pub async fn delete_supplier_token_handler(
    State(pool): State<Arc<DbPool>>,
    Path((request_id, token_id)): Path<(String, String)>,
) -> Result<Json<()>, ApiError> {
    if !repo::delete_supplier_token(&pool, &request_id, &token_id)? {
        return Err(ApiError::NotFound("Supplier link"));
    }
    Ok(Json(()))
}

/// Handler refreshing a request's materials from its project
///
/// This function handles POST requests to `/supplier-requests/{id}/sync`.
/// Links whose supplier should look again are flagged.
#[instrument(skip(pool))]
pub async fn sync_request_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
) -> Result<Json<SyncSummary>, ApiError> {
    let request = repo::get_supplier_request(&pool, &request_id)?
        .ok_or(ApiError::NotFound("Supplier request"))?;

    let summary = repo::sync_request_materials(&pool, &request)?;

    info!(
        "Request {} now at materials version {}",
        request.get_request_number(),
        summary.version
    );
    Ok(Json(summary))
}

#[instrument(skip(pool))]
pub async fn sync_status_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
) -> Result<Json<SyncStatus>, ApiError> {
    let request = repo::get_supplier_request(&pool, &request_id)?
        .ok_or(ApiError::NotFound("Supplier request"))?;

    Ok(Json(repo::request_sync_status(&pool, &request)?))
}
