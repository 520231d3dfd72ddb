/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database: projects and
/// their materials, suppliers and prices, requests for quotation with their
/// per-supplier links and the quotes answering them, the quotation archive, comments, collaborators
/// and notifications.
///
/// Every function takes the pool, checks out one connection and returns an
/// `anyhow::Result`. Lookups by id return `Ok(None)` when nothing matches.

use thiserror::Error;

mod project_repo;
mod material_repo;
mod supplier_repo;
mod price_repo;
mod exchange_rate_repo;
mod supplier_request_repo;
mod supplier_token_repo;
mod quote_repo;
mod material_quotation_repo;
mod comment_repo;
mod collaborator_repo;
mod notification_repo;

// Re-export all repository functions
pub use project_repo::*;
pub use material_repo::*;
pub use supplier_repo::*;
pub use price_repo::*;
pub use exchange_rate_repo::*;
pub use supplier_request_repo::*;
pub use supplier_token_repo::*;
pub use quote_repo::*;
pub use material_quotation_repo::*;
pub use comment_repo::*;
pub use collaborator_repo::*;
pub use notification_repo::*;

/// A write refused because it contradicts the current state of a row
///
/// Carried inside `anyhow::Error` and turned into a 409 by the API layer.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Conflict(pub String);

/// Whether `err` is SQLite rejecting a duplicate key
pub(crate) fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _)
    )
}
