use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::currency::{ExchangeRateTable, SETTLEMENT_CURRENCY, normalize_currency};
use super::margin::{MarginPolicy, apply_margin_to_variations, price_with_margin};
use crate::models::{Material, PriceDraft, QuotationDraft, SupplierQuote, normalize_material_name};

/// A price ready to be inserted for a project material
#[derive(Debug, Clone, PartialEq)]
pub struct ClientPrice {
    pub material_id: String,
    pub draft: PriceDraft,
}

/// The outcome of preparing a quote for a client
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrokeragePlan {
    pub prices: Vec<ClientPrice>,
    /// Raw supplier prices to keep in the comparison archive
    pub quotations: Vec<QuotationDraft>,
    /// Names of quoted materials with no counterpart in the project
    pub unmatched: Vec<String>,
    /// Number of distinct project materials that received a price
    pub matched_materials: usize,
}

/// Summary returned once a quote has been sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendSummary {
    pub quote_id: String,
    pub prices_inserted: usize,
    pub quotations_archived: usize,
    pub material_count: usize,
    pub unmatched_materials: Vec<String>,
    pub notification_id: Option<String>,
}

/// The notes clients see on a brokered price
pub fn client_notes(reference: &str, country: &str) -> String {
    format!("Reference: {}\nCountry: {}", reference, country)
}

/// Prepares the client prices for `quote`
///
/// Quoted materials are matched to `materials` by trimmed, case-insensitive
/// name. Every matched price is marked up with the policy's margin for that
/// line and converted to the settlement currency.
pub fn plan_client_prices(
    quote: &SupplierQuote,
    project_id: &str,
    materials: &[Material],
    policy: &MarginPolicy,
    rates: &ExchangeRateTable,
    fallback_rate: f64,
    broker_supplier_id: &str,
) -> BrokeragePlan {
    let by_name: HashMap<String, &Material> = materials
        .iter()
        .map(|m| (m.normalized_name(), m))
        .collect();

    let reference = quote.client_reference();
    let supplier = quote.get_supplier();
    let mut plan = BrokeragePlan::default();
    let mut matched = HashSet::new();

    for quoted in quote.get_quoted_materials() {
        if !quoted.has_prices() {
            continue;
        }

        let Some(material) = by_name.get(&normalize_material_name(&quoted.name)) else {
            plan.unmatched.push(quoted.name.clone());
            continue;
        };

        let margin = policy.margin_for(&quoted.id);
        for price in &quoted.prices {
            let currency = normalize_currency(&price.currency);
            let final_amount = price_with_margin(price.amount, margin);
            let converted = if currency == SETTLEMENT_CURRENCY {
                final_amount
            } else {
                rates.convert_or_fallback(final_amount, &currency, SETTLEMENT_CURRENCY, fallback_rate)
            };
            let country = price
                .country
                .clone()
                .unwrap_or_else(|| supplier.country.clone());

            plan.prices.push(ClientPrice {
                material_id: material.get_id(),
                draft: PriceDraft {
                    supplier_id: Some(broker_supplier_id.to_string()),
                    country: Some(country.clone()),
                    amount: final_amount,
                    currency: currency.clone(),
                    converted_amount: Some(converted),
                    supplier_reference: Some(reference.clone()),
                    notes: Some(client_notes(&reference, &country)),
                    variations: apply_margin_to_variations(&price.variations, margin),
                },
            });

            let rate_used = rates.effective_rate(&currency, SETTLEMENT_CURRENCY, fallback_rate);
            plan.quotations.push(QuotationDraft {
                material_name: material.get_name(),
                material_category: quoted.category.clone().or_else(|| material.get_category()),
                project_id: Some(project_id.to_string()),
                supplier_email: supplier.email.clone(),
                supplier_company: supplier.company.clone(),
                supplier_name: Some(supplier.name.clone()),
                supplier_country: Some(country),
                unit_price: price.amount,
                currency: currency.clone(),
                unit: price.unit.clone().or_else(|| material.get_unit()),
                moq: price.moq,
                variations: price.variations.clone(),
                converted_price_fcfa: Some(price.amount * rate_used),
                exchange_rate_used: Some(rate_used),
                source_quote_id: Some(quote.get_id()),
                notes: price.notes.clone(),
            });
        }
        matched.insert(material.get_id());
    }

    plan.matched_materials = matched.len();
    plan
}
