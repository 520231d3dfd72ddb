/// Procura: a sourcing and procurement backend
///
/// This library provides the core functionality for brokering construction
/// material quotations: projects and their material lists, requests for
/// quotation sent to suppliers, margin and currency handling when a quote is
/// forwarded to the client, and an archive of supplier prices for comparison.
///
/// ### Modules
///
/// - `ai`: Boundary with the hosted completion API
/// - `config`: Layered configuration
/// - `db`: Database connection management
/// - `dto`: Request and response bodies
/// - `errors`: API error type
/// - `export`: CSV rendering
/// - `handlers`: HTTP handlers
/// - `models`: Data structures stored in the database
/// - `pricing`: Margin, currency, brokerage and comparison rules
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
///
/// ### Web API
///
/// The library exposes a JSON API using Axum; see [`create_app`] for the
/// routes.

pub mod ai;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repo;
pub mod schema;

#[cfg(test)]
pub mod test_utils;

use axum::{
    extract::FromRef,
    routing::{delete, get, patch, post, put},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::ai::CompletionProvider;
use crate::config::Config;
use crate::handlers::*;

/// Embedded migrations
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub ai: Arc<dyn CompletionProvider>,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - The pool, completion provider and configuration shared with
///   all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and the application state
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Projects and what hangs off them
        .route("/projects", post(create_project_handler).get(list_projects_handler))
        .route(
            "/projects/{id}",
            get(get_project_handler)
                .patch(update_project_handler)
                .delete(delete_project_handler),
        )
        .route("/projects/{id}/materials", post(create_material_handler).get(list_materials_handler))
        .route("/projects/{id}/materials/categories", put(assign_categories_handler))
        .route("/projects/{id}/prices", get(list_project_prices_handler))
        .route("/projects/{id}/comparison", get(project_comparison_handler))
        .route("/projects/{id}/supplier-requests", post(create_supplier_request_handler))
        .route(
            "/projects/{id}/collaborators",
            post(invite_collaborator_handler).get(list_collaborators_handler),
        )
        .route("/projects/{id}/collaborators/accept", post(accept_invitation_handler))
        .route(
            "/projects/{id}/collaborators/{collaborator_id}",
            delete(remove_collaborator_handler),
        )
        // Materials
        .route(
            "/materials/{id}",
            get(get_material_handler)
                .patch(update_material_handler)
                .delete(delete_material_handler),
        )
        .route("/materials/{id}/prices", post(add_price_handler).get(list_prices_handler))
        .route("/materials/{id}/comments", post(add_comment_handler).get(list_comments_handler))
        .route("/comments/{id}", delete(delete_comment_handler))
        // Suppliers and currencies
        .route("/suppliers", post(create_supplier_handler).get(list_suppliers_handler))
        .route("/suppliers/{id}", get(get_supplier_handler))
        .route(
            "/exchange-rates",
            post(upsert_exchange_rate_handler).get(list_exchange_rates_handler),
        )
        .route("/exchange-rates/convert", get(convert_currency_handler))
        .route("/exchange-rates/{id}", delete(delete_exchange_rate_handler))
        // Requests for quotation and supplier answers
        .route("/supplier-requests", get(list_supplier_requests_handler))
        .route("/supplier-requests/{id}", get(get_supplier_request_handler))
        .route("/supplier-requests/{id}/status", patch(update_request_status_handler))
        .route(
            "/supplier-requests/{id}/tokens",
            get(list_supplier_tokens_handler).post(add_supplier_tokens_handler),
        )
        .route("/supplier-requests/{id}/tokens/{token_id}", delete(delete_supplier_token_handler))
        .route("/supplier-requests/{id}/sync", get(sync_status_handler).post(sync_request_handler))
        .route("/public/requests/{token}", get(get_public_request_handler))
        .route("/public/requests/{token}/quotes", post(submit_quote_handler))
        .route("/quotes", get(list_quotes_handler))
        .route("/quotes/{id}", get(get_quote_handler))
        .route("/quotes/{id}/margin", patch(update_quote_margin_handler))
        .route("/quotes/{id}/send", post(send_quote_handler))
        // Quotation archive
        .route("/quotations", get(list_quotations_handler).post(create_quotations_handler))
        .route("/quotations/comparison", get(quotation_comparison_handler))
        .route("/quotations/by-supplier", get(quotations_by_supplier_handler))
        .route("/quotations/stats", get(quotation_stats_handler))
        .route("/quotations/export", get(export_comparison_handler))
        .route("/quotations/{id}", get(get_quotation_handler).patch(update_quotation_handler))
        // Notifications
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/{id}/read", post(mark_notification_read_handler))
        // Completion-backed helpers
        .route("/ai/analyze-file", post(analyze_file_handler))
        .route("/ai/categorize", post(categorize_handler))
        .route("/ai/suggest", post(suggest_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if a migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the run_migrations function
    ///
    /// Running the migrations a second time must be a no-op.
    #[test]
    fn test_run_migrations_is_idempotent() {
        let pool = db::init_pool(&format!(
            "file:migrations_{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        ))
        .unwrap();
        let mut conn = pool.get().unwrap();

        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();
    }
}
