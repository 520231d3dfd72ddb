/// Data models module
///
/// This module defines the records stored by the procurement service and the
/// typed payloads embedded in their JSON columns.

// Re-export all model types
mod json_value;
pub use json_value::JsonValue;

mod status;
pub use status::{
    CollaboratorRole, CollaboratorStatus, MaterialChange, QuotationStatus, QuoteStatus,
    RequestStatus, TokenStatus,
};

mod project;
pub use project::Project;

mod material;
pub use material::{Material, MaterialDraft, normalize_material_name};

mod supplier;
pub use supplier::Supplier;

mod price;
pub use price::{Price, PriceDraft, PriceVariation};

mod exchange_rate;
pub use exchange_rate::ExchangeRate;

mod supplier_request;
pub use supplier_request::{
    CommentSnapshot, MAX_EXPIRY_DAYS, PUBLIC_TOKEN_LENGTH, RequestMaterial, RequestOptions,
    SupplierRequest, expiry_after, generate_public_token, generate_request_number,
};

mod supplier_token;
pub use supplier_token::{
    DEFAULT_LINK_LIFETIME_DAYS, MAX_LINKS_PER_BATCH, PendingUpdate, SupplierToken,
    detect_material_changes,
};

mod supplier_quote;
pub use supplier_quote::{
    QuotedMaterial, QuotedPrice, SupplierIdentity, SupplierQuote, default_reference,
};

mod material_quotation;
pub use material_quotation::{MaterialQuotation, QuotationDraft};

mod material_comment;
pub use material_comment::MaterialComment;

mod collaborator;
pub use collaborator::ProjectCollaborator;

mod notification;
pub use notification::{COLLABORATION_ACCEPTED, Notification, QUOTE_RECEIVED};
