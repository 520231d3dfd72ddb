/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository or
/// completion functions, and returning a properly formatted response.

mod project_handlers;
mod material_handlers;
mod supplier_handlers;
mod price_handlers;
mod exchange_rate_handlers;
mod supplier_request_handlers;
mod quote_handlers;
mod quotation_handlers;
mod collaboration_handlers;
mod ai_handlers;

// Re-export all handlers
pub use project_handlers::*;
pub use material_handlers::*;
pub use supplier_handlers::*;
pub use price_handlers::*;
pub use exchange_rate_handlers::*;
pub use supplier_request_handlers::*;
pub use quote_handlers::*;
pub use quotation_handlers::*;
pub use collaboration_handlers::*;
pub use ai_handlers::*;
