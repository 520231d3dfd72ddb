use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

use crate::models::{
    CollaboratorRole, MaterialDraft, PendingUpdate, PriceDraft, QuotationDraft, QuotationStatus,
    QuotedMaterial, RequestMaterial, RequestOptions, RequestStatus, SupplierIdentity,
    SupplierRequest, SupplierToken,
};
use crate::pricing::{ComparisonFilter, MarginPolicy, SortOrder};

/// Default page size for paginated listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a caller may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of rows returned by the quotation listing
pub const DEFAULT_QUOTATION_LIMIT: i64 = 100;

/// Data transfer object for creating a project
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateProjectDto {
    /// The tenant that will own the project
    pub owner_id: String,

    pub name: String,

    /// Kind of construction work (e.g. "Villa", "Warehouse")
    #[serde(default)]
    pub project_type: Option<String>,
}

/// Data transfer object for updating a project
///
/// Fields left out are not changed.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateProjectDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
}

/// Query parameters selecting the tenant a listing is scoped to
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OwnerQuery {
    pub owner_id: String,
}

/// Page selection for listings
///
/// `page` starts at 1. Out of range values are clamped rather than rejected.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// The page number, at least 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// The page size, between 1 and [`MAX_PAGE_SIZE`]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of rows to skip, saturating for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Query parameters for listing projects
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectListQuery {
    pub owner_id: String,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ProjectListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// One page of a listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let limit = query.limit();
        Self {
            data,
            total,
            page: query.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Partial update of a material
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct UpdateMaterialDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub weight: Option<f64>,
    pub volume: Option<f64>,
    pub specs: Option<serde_json::Value>,
}

/// Category assignment for many materials at once, keyed by material id
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssignCategoriesDto {
    pub category_map: HashMap<String, String>,
}

/// Number of materials whose category was written
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdatedCount {
    pub updated: usize,
}

/// Data transfer object for creating a supplier
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSupplierDto {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub contact_info: Option<serde_json::Value>,
}

/// Data transfer object for storing an exchange rate
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpsertExchangeRateDto {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
}

/// Query parameters for a currency conversion
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from: String,
    #[serde(default = "default_target_currency")]
    pub to: String,
}

fn default_target_currency() -> String {
    crate::pricing::SETTLEMENT_CURRENCY.to_string()
}

/// Result of a currency conversion
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversionDto {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub converted: f64,
    /// Whether the configured fallback rate was used because no rate is stored
    pub fallback_used: bool,
}

/// Data transfer object for sending a project out for quotation
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSupplierRequestDto {
    pub owner_id: String,
    #[serde(default)]
    pub num_suppliers: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub shipping_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub expires_in_days: Option<i64>,
}

impl CreateSupplierRequestDto {
    /// Fills the unset options with their defaults
    pub fn options(&self) -> RequestOptions {
        let defaults = RequestOptions::default();
        RequestOptions {
            num_suppliers: self.num_suppliers.unwrap_or(defaults.num_suppliers),
            country: self.country.clone().unwrap_or(defaults.country),
            shipping_type: self.shipping_type.clone().unwrap_or(defaults.shipping_type),
            notes: self.notes.clone(),
            expires_in_days: self.expires_in_days,
        }
    }
}

/// A supplier's answer submitted through the public link
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmitQuoteDto {
    pub supplier: SupplierIdentity,
    pub quoted_materials: Vec<QuotedMaterial>,
}

/// Stores the margin an administrator intends to apply to a quote
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateMarginDto {
    pub admin_margin: f64,
}

/// Data transfer object for forwarding a quote to the client
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SendQuoteDto {
    #[serde(flatten)]
    pub policy: MarginPolicy,

    /// Overwrite every individual margin with the global one before sending
    #[serde(default)]
    pub apply_global_to_all: bool,
}

impl SendQuoteDto {
    /// The margin policy to send with, after the optional global overwrite
    pub fn into_policy(self) -> MarginPolicy {
        let mut policy = self.policy;
        if self.apply_global_to_all {
            policy.apply_global_to_all();
        }
        policy
    }
}

/// Column to order the quotation listing by
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuotationSort {
    #[default]
    CreatedAt,
    UnitPrice,
    MaterialName,
    SupplierCountry,
}

/// Which statuses the quotation listing includes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatusFilter {
    #[default]
    Active,
    Archived,
    All,
}

impl QuotationStatusFilter {
    /// The single status to match, or None to match every status
    pub fn status(&self) -> Option<QuotationStatus> {
        match self {
            QuotationStatusFilter::Active => Some(QuotationStatus::Active),
            QuotationStatusFilter::Archived => Some(QuotationStatus::Archived),
            QuotationStatusFilter::All => None,
        }
    }
}

/// Query parameters for listing material quotations
///
/// `country` may be repeated to match any of several countries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct QuotationListQuery {
    /// Case-insensitive substring of the material name
    pub material: Option<String>,

    /// Case-insensitive substring of the supplier company, name or email
    pub supplier: Option<String>,

    #[serde(rename = "country")]
    pub countries: Vec<String>,

    pub category: Option<String>,

    /// `active` unless asked otherwise; `all` lifts the filter
    pub status: QuotationStatusFilter,

    pub sort_by: QuotationSort,

    pub sort_order: SortOrder,

    pub limit: Option<i64>,

    pub offset: Option<i64>,
}

impl Default for QuotationListQuery {
    fn default() -> Self {
        Self {
            material: None,
            supplier: None,
            countries: Vec::new(),
            category: None,
            status: QuotationStatusFilter::Active,
            sort_by: QuotationSort::CreatedAt,
            sort_order: SortOrder::Desc,
            limit: None,
            offset: None,
        }
    }
}

impl QuotationListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_QUOTATION_LIMIT).clamp(1, 1000)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

impl Display for QuotationListQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "QuotationListQuery {{ material: {:?}, supplier: {:?}, countries: {:?}, category: {:?}, status: {:?}, sort_by: {:?}, sort_order: {:?}, limit: {}, offset: {} }}",
            self.material,
            self.supplier,
            self.countries,
            self.category,
            self.status,
            self.sort_by,
            self.sort_order,
            self.limit(),
            self.offset(),
        )
    }
}

/// Distinct values available to filter the quotation listing with
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct QuotationFilterOptions {
    pub materials: Vec<String>,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
}

/// One window of the quotation listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuotationPage<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub filters: QuotationFilterOptions,
}

/// Query parameters of the comparison view and its CSV export
pub type ComparisonQuery = ComparisonFilter;

/// Quotations typed in by an administrator rather than derived from a quote
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateQuotationsDto {
    pub quotations: Vec<QuotationDraft>,

    /// Quote the batch was transcribed from, stamped on every entry
    #[serde(default)]
    pub source_quote_id: Option<String>,

    /// Supplier identity filled into entries that lack one
    #[serde(default)]
    pub supplier: Option<SupplierIdentity>,
}

/// Data transfer object for updating a material quotation
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateQuotationDto {
    pub status: Option<QuotationStatus>,
    pub notes: Option<String>,
}

/// Query parameters of the project country comparison
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ProjectComparisonQuery {
    pub baseline: Option<String>,
    pub candidate: Option<String>,
}

/// Data transfer object for commenting on a material
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateCommentDto {
    pub user_name: String,
    pub user_email: String,
    pub comment: String,
}

/// Data transfer object for inviting someone onto a project
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InviteCollaboratorDto {
    pub email: String,
    pub role: CollaboratorRole,
    pub invited_by: String,
}

/// Query parameters for listing notifications
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationQuery {
    pub user_id: String,
    #[serde(default)]
    pub unread_only: bool,
}

/// Body of the file structure analysis
///
/// `file_sample` is kept as raw JSON so a missing or malformed sample can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFileDto {
    #[serde(default)]
    pub file_sample: Option<serde_json::Value>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl AnalyzeFileDto {
    /// The sample rows, if the sample is a non-empty array
    pub fn sample_rows(&self) -> Option<&[serde_json::Value]> {
        match &self.file_sample {
            Some(serde_json::Value::Array(rows)) if !rows.is_empty() => Some(rows),
            _ => None,
        }
    }
}

/// Wrapper of the file structure answer
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStructureResponse {
    pub config: crate::ai::FileStructure,
}

/// Body of the categorization call
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeDto {
    pub materials: Vec<crate::ai::MaterialDescriptor>,
    #[serde(default)]
    pub project_type: Option<String>,
}

/// Body of the suggestion call
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SuggestDto {
    pub materials: Vec<crate::ai::MaterialDescriptor>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
}

/// Body of a material creation request
pub type CreateMaterialDto = MaterialDraft;

/// Body of a price creation request
pub type CreatePriceDto = PriceDraft;

/// What a supplier sees through the public link of a request
///
/// The owner and internal ids of the project stay hidden.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicRequestView {
    pub request_number: String,
    pub status: String,
    pub materials: Vec<RequestMaterial>,
    pub total_materials: i32,
    pub country: String,
    pub shipping_type: String,
    pub notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub materials_version: i32,
    /// Materials that changed since this supplier's link was last synced
    #[serde(default)]
    pub pending_updates: Vec<PendingUpdate>,
}

impl From<&SupplierRequest> for PublicRequestView {
    fn from(request: &SupplierRequest) -> Self {
        Self {
            request_number: request.get_request_number(),
            status: request.get_status(),
            materials: request.get_materials(),
            total_materials: request.get_total_materials(),
            country: request.get_country(),
            shipping_type: request.get_shipping_type(),
            notes: request.get_notes(),
            expires_at: request.get_expires_at(),
            materials_version: request.get_materials_version(),
            pending_updates: vec![],
        }
    }
}

impl PublicRequestView {
    /// The request as seen through one supplier's personal link
    pub fn for_link(request: &SupplierRequest, link: &SupplierToken) -> Self {
        Self {
            expires_at: link.get_expires_at(),
            pending_updates: link.get_pending_updates(),
            ..Self::from(request)
        }
    }
}

/// Body of the call handing out more supplier links
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AddLinksDto {
    /// How many links to add, one when omitted
    pub count: Option<i32>,
}

impl AddLinksDto {
    pub fn count(&self) -> i32 {
        self.count.unwrap_or(1)
    }
}

/// Outcome of refreshing a request's materials from its project
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub version: i32,
    pub changed_materials: usize,
    pub suppliers_synced: usize,
}

/// How far behind each supplier link of a request is
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub current_version: i32,
    pub last_update: Option<DateTime<Utc>>,
    pub suppliers: Vec<LinkSyncState>,
    pub needs_sync_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkSyncState {
    pub id: String,
    pub name: Option<String>,
    pub status: String,
    pub version: i32,
    pub has_pending_updates: bool,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub needs_sync: bool,
}

impl LinkSyncState {
    pub fn new(link: &SupplierToken, current_version: i32) -> Self {
        Self {
            id: link.get_id(),
            name: link.display_name(),
            status: link.get_status(),
            version: link.get_materials_version(),
            has_pending_updates: link.has_pending_updates(),
            last_viewed_at: link.get_last_viewed_at(),
            needs_sync: link.needs_sync(current_version),
        }
    }
}

/// Moves a request for quotation to another status
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateRequestStatusDto {
    pub status: RequestStatus,
}

/// Query parameters for listing requests for quotation
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RequestListQuery {
    pub owner_id: Option<String>,
}

/// Query parameters for listing supplier quotes
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct QuoteListQuery {
    pub request_id: Option<String>,
}

/// Data transfer object for accepting an invitation
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AcceptInvitationDto {
    pub email: String,
}

/// An unpaged listing with its length
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod prop_tests;
