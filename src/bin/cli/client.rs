use procura::dto::{
    AddLinksDto, ConversionDto, CreateProjectDto, CreateSupplierRequestDto, Listing, Paginated,
    QuotationPage, SendQuoteDto, SyncSummary, UpdateMarginDto, UpsertExchangeRateDto,
};
use procura::models::{
    ExchangeRate, Material, MaterialQuotation, Project, SupplierQuote, SupplierRequest,
    SupplierToken,
};
use procura::pricing::{MarginPolicy, MaterialComparison, QuotationStats, SendSummary};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error type for CLI client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server returned an error status with a message body
    #[error("Server error ({}): {message}", .status.as_u16())]
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Filters of the quotation listing, as sent on the query string
#[derive(Debug, Clone, Default)]
pub struct QuotationFilters {
    pub material: Option<String>,
    pub supplier: Option<String>,
    pub countries: Vec<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<i64>,
}

/// Builds query parameters from the quotation filters
///
/// Countries are sent as repeated `country` parameters.
fn quotation_params(filters: &QuotationFilters) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(ref material) = filters.material {
        params.push(("material", material.clone()));
    }
    if let Some(ref supplier) = filters.supplier {
        params.push(("supplier", supplier.clone()));
    }
    for country in &filters.countries {
        params.push(("country", country.clone()));
    }
    if let Some(ref category) = filters.category {
        params.push(("category", category.clone()));
    }
    if let Some(ref sort_by) = filters.sort_by {
        params.push(("sort_by", sort_by.clone()));
    }
    if let Some(ref sort_order) = filters.sort_order {
        params.push(("sort_order", sort_order.clone()));
    }
    if let Some(limit) = filters.limit {
        params.push(("limit", limit.to_string()));
    }

    params
}

/// HTTP client wrapper for communicating with the Procura server
pub struct ProcuraClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl ProcuraClient {
    /// Creates a new ProcuraClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the Procura server
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send().await?.check().await?;
        Ok(response.json().await?)
    }

    // ── Project endpoints ────────────────────────────────────────────

    /// Lists one page of the projects of an owner
    pub async fn list_projects(&self, owner_id: &str, page: i64, limit: i64) -> Result<Paginated<Project>, ClientError> {
        let params = [("owner_id", owner_id.to_string()), ("page", page.to_string()), ("limit", limit.to_string())];
        let response = self.client.get(self.url("/projects")).query(&params)
            .send().await?
            .check().await?;
        Ok(response.json().await?)
    }

    /// Creates a new project
    pub async fn create_project(
        &self,
        owner_id: String,
        name: String,
        project_type: Option<String>,
    ) -> Result<Project, ClientError> {
        let dto = CreateProjectDto { owner_id, name, project_type };
        let response = self.client.post(self.url("/projects")).json(&dto).send().await?.check().await?;
        Ok(response.json().await?)
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, ClientError> {
        self.get_json(&format!("/projects/{}", id)).await
    }

    /// Deletes a project with its materials, prices and requests
    pub async fn delete_project(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(self.url(&format!("/projects/{}", id))).send().await?.check().await?;
        Ok(())
    }

    pub async fn list_materials(&self, project_id: &str) -> Result<Vec<Material>, ClientError> {
        self.get_json(&format!("/projects/{}/materials", project_id)).await
    }

    // ── Request for quotation endpoints ──────────────────────────────

    /// Sends a project out for quotation
    pub async fn create_request(&self, project_id: &str, dto: &CreateSupplierRequestDto) -> Result<SupplierRequest, ClientError> {
        let url = self.url(&format!("/projects/{}/supplier-requests", project_id));
        let response = self.client.post(&url).json(dto).send().await?.check().await?;
        Ok(response.json().await?)
    }

    /// Lists requests, optionally those of one owner
    pub async fn list_requests(&self, owner_id: Option<&str>) -> Result<Vec<SupplierRequest>, ClientError> {
        let mut request = self.client.get(self.url("/supplier-requests"));
        if let Some(owner_id) = owner_id {
            request = request.query(&[("owner_id", owner_id)]);
        }
        let response = request.send().await?.check().await?;
        Ok(response.json().await?)
    }

    pub async fn get_request(&self, id: &str) -> Result<SupplierRequest, ClientError> {
        self.get_json(&format!("/supplier-requests/{}", id)).await
    }

    /// Lists the personal supplier links of a request
    pub async fn list_links(&self, request_id: &str) -> Result<Listing<SupplierToken>, ClientError> {
        self.get_json(&format!("/supplier-requests/{}/tokens", request_id)).await
    }

    /// Hands out more supplier links and returns the new ones
    pub async fn add_links(&self, request_id: &str, count: Option<i32>) -> Result<Listing<SupplierToken>, ClientError> {
        let url = self.url(&format!("/supplier-requests/{}/tokens", request_id));
        let dto = AddLinksDto { count };
        let response = self.client.post(&url).json(&dto).send().await?.check().await?;
        Ok(response.json().await?)
    }

    /// Refreshes a request from its project's current materials
    pub async fn sync_request(&self, request_id: &str) -> Result<SyncSummary, ClientError> {
        let url = self.url(&format!("/supplier-requests/{}/sync", request_id));
        let response = self.client.post(&url).send().await?.check().await?;
        Ok(response.json().await?)
    }

    // ── Quote endpoints ──────────────────────────────────────────────

    /// Lists supplier quotes, optionally those answering one request
    pub async fn list_quotes(&self, request_id: Option<&str>) -> Result<Vec<SupplierQuote>, ClientError> {
        let mut request = self.client.get(self.url("/quotes"));
        if let Some(request_id) = request_id {
            request = request.query(&[("request_id", request_id)]);
        }
        let response = request.send().await?.check().await?;
        Ok(response.json().await?)
    }

    pub async fn get_quote(&self, id: &str) -> Result<SupplierQuote, ClientError> {
        self.get_json(&format!("/quotes/{}", id)).await
    }

    /// Stores the margin planned for a quote
    pub async fn set_quote_margin(&self, id: &str, admin_margin: f64) -> Result<SupplierQuote, ClientError> {
        let dto = UpdateMarginDto { admin_margin };
        let url = self.url(&format!("/quotes/{}/margin", id));
        let response = self.client.patch(&url).json(&dto).send().await?.check().await?;
        Ok(response.json().await?)
    }

    /// Forwards a quote to the client with a global margin
    pub async fn send_quote(&self, id: &str, global_margin: f64) -> Result<SendSummary, ClientError> {
        let dto = SendQuoteDto {
            policy: MarginPolicy::global(global_margin),
            apply_global_to_all: false,
        };
        let url = self.url(&format!("/quotes/{}/send", id));
        let response = self.client.post(&url).json(&dto).send().await?.check().await?;
        Ok(response.json().await?)
    }

    // ── Quotation archive endpoints ──────────────────────────────────

    /// Lists archived quotations matching the filters
    pub async fn list_quotations(&self, filters: &QuotationFilters) -> Result<QuotationPage<MaterialQuotation>, ClientError> {
        let params = quotation_params(filters);
        let response = self.client.get(self.url("/quotations")).query(&params)
            .send().await?
            .check().await?;
        Ok(response.json().await?)
    }

    /// Per-material comparison of the archive
    pub async fn quotation_comparison(&self, search: Option<&str>, category: Option<&str>) -> Result<Listing<MaterialComparison>, ClientError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(search) = search {
            params.push(("search", search));
        }
        if let Some(category) = category {
            params.push(("category", category));
        }
        let response = self.client.get(self.url("/quotations/comparison")).query(&params)
            .send().await?
            .check().await?;
        Ok(response.json().await?)
    }

    pub async fn quotation_stats(&self) -> Result<QuotationStats, ClientError> {
        self.get_json("/quotations/stats").await
    }

    /// Downloads the comparison as CSV text
    pub async fn export_comparison(&self) -> Result<String, ClientError> {
        let response = self.client.get(self.url("/quotations/export")).send().await?.check().await?;
        Ok(response.text().await?)
    }

    // ── Exchange rate endpoints ──────────────────────────────────────

    pub async fn list_rates(&self) -> Result<Vec<ExchangeRate>, ClientError> {
        self.get_json("/exchange-rates").await
    }

    /// Stores or replaces the rate of a currency pair
    pub async fn set_rate(&self, from_currency: String, to_currency: String, rate: f64) -> Result<ExchangeRate, ClientError> {
        let dto = UpsertExchangeRateDto { from_currency, to_currency, rate };
        let response = self.client.post(self.url("/exchange-rates")).json(&dto).send().await?.check().await?;
        Ok(response.json().await?)
    }

    /// Converts an amount on the server
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<ConversionDto, ClientError> {
        let params = [("amount", amount.to_string()), ("from", from.to_string()), ("to", to.to_string())];
        let response = self.client.get(self.url("/exchange-rates/convert")).query(&params)
            .send().await?
            .check().await?;
        Ok(response.json().await?)
    }
}
