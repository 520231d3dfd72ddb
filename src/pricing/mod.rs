/// Pricing rules for brokered quotes
///
/// Margin arithmetic, currency conversion, preparation of client prices from
/// a supplier quote, and the aggregations behind the comparison views.
pub mod brokerage;
pub mod comparison;
pub mod currency;
pub mod margin;

pub use brokerage::{BrokeragePlan, ClientPrice, SendSummary, plan_client_prices};
pub use comparison::{
    ComparisonFilter, ComparisonSort, MaterialComparison, ProjectComparison, QuotationStats,
    SortOrder, SupplierSummary, build_comparisons, filter_and_sort, group_by_supplier,
    project_comparison, quotation_stats,
};
pub use currency::{
    DEFAULT_FALLBACK_RATE, ExchangeRateTable, SETTLEMENT_CURRENCY, fallback_rates_to_fcfa,
    normalize_currency,
};
pub use margin::{MarginPolicy, margin_amount, price_with_margin, validate_margin};
