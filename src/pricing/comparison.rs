//! Aggregations over archived material quotations and project prices.
//!
//! Everything here works on rows that have already been fetched; none of it
//! touches the database.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Material, MaterialQuotation, Price};

/// Price comparison for one material across suppliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialComparison {
    pub material_name: String,
    pub material_category: Option<String>,
    pub supplier_count: usize,
    pub quotation_count: usize,
    pub avg_price: f64,
    pub lowest_price: f64,
    pub highest_price: f64,
    pub price_range: f64,
    pub most_common_currency: String,
    pub lowest_quote: MaterialQuotation,
    pub all_quotes: Vec<MaterialQuotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSort {
    #[default]
    LowestPrice,
    SupplierCount,
    QuotationCount,
    MaterialName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Client-side narrowing of a comparison list
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ComparisonFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_by: ComparisonSort,
    #[serde(default)]
    pub order: SortOrder,
}

/// A quotation as listed under its supplier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierMaterial {
    pub material_name: String,
    pub material_category: Option<String>,
    pub unit_price: f64,
    pub currency: String,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Every quotation of one supplier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub supplier_email: String,
    pub supplier_company: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_country: Option<String>,
    pub materials: Vec<SupplierMaterial>,
    pub total_quotations: usize,
    pub first_quotation: DateTime<Utc>,
    pub last_quotation: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationStats {
    pub total_quotations: usize,
    pub unique_suppliers: usize,
    pub unique_materials: usize,
    pub unique_countries: usize,
    pub recent_quotations_30d: usize,
    pub by_currency: BTreeMap<String, usize>,
    pub by_country: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn by_unit_price(a: &MaterialQuotation, b: &MaterialQuotation) -> Ordering {
    a.get_unit_price()
        .partial_cmp(&b.get_unit_price())
        .unwrap_or(Ordering::Equal)
}

/// The most frequent currency; ties go to the currency of the earliest entry
fn most_common_currency(sorted_quotes: &[MaterialQuotation]) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for quote in sorted_quotes {
        *counts.entry(quote.get_currency()).or_default() += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    sorted_quotes
        .iter()
        .map(|q| q.get_currency())
        .find(|c| counts.get(c) == Some(&best))
        .unwrap_or_default()
}

/// Groups quotations by material name and computes price statistics
///
/// Groups keep the order in which material names first appear.
pub fn build_comparisons(quotations: &[MaterialQuotation]) -> Vec<MaterialComparison> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<MaterialQuotation>> = HashMap::new();
    for quotation in quotations {
        let name = quotation.get_material_name();
        if !groups.contains_key(&name) {
            order.push(name.clone());
        }
        groups.entry(name).or_default().push(quotation.clone());
    }

    order
        .into_iter()
        .filter_map(|name| {
            let mut quotes = groups.remove(&name)?;
            quotes.sort_by(by_unit_price);
            let lowest_quote = quotes.first()?.clone();

            let prices: Vec<f64> = quotes.iter().map(|q| q.get_unit_price()).collect();
            let lowest = prices.iter().copied().fold(f64::INFINITY, f64::min);
            let highest = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = prices.iter().sum::<f64>() / prices.len() as f64;
            let suppliers: HashSet<String> = quotes.iter().map(|q| q.get_supplier_email()).collect();

            Some(MaterialComparison {
                material_name: name,
                material_category: quotes.iter().find_map(|q| q.get_material_category()),
                supplier_count: suppliers.len(),
                quotation_count: quotes.len(),
                avg_price: round2(avg),
                lowest_price: lowest,
                highest_price: highest,
                price_range: highest - lowest,
                most_common_currency: most_common_currency(&quotes),
                lowest_quote,
                all_quotes: quotes,
            })
        })
        .collect()
}

/// Applies search, category and sort to a comparison list
pub fn filter_and_sort(
    comparisons: Vec<MaterialComparison>,
    filter: &ComparisonFilter,
) -> Vec<MaterialComparison> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let category = filter.category.as_deref().filter(|c| !c.is_empty() && *c != "all");

    let mut result: Vec<MaterialComparison> = comparisons
        .into_iter()
        .filter(|c| match &search {
            Some(term) => c.material_name.to_lowercase().contains(term),
            None => true,
        })
        .filter(|c| match category {
            Some(cat) => c.material_category.as_deref() == Some(cat),
            None => true,
        })
        .collect();

    result.sort_by(|a, b| {
        let ordering = match filter.sort_by {
            ComparisonSort::LowestPrice => a
                .lowest_price
                .partial_cmp(&b.lowest_price)
                .unwrap_or(Ordering::Equal),
            ComparisonSort::SupplierCount => a.supplier_count.cmp(&b.supplier_count),
            ComparisonSort::QuotationCount => a.quotation_count.cmp(&b.quotation_count),
            ComparisonSort::MaterialName => a
                .material_name
                .to_lowercase()
                .cmp(&b.material_name.to_lowercase()),
        };
        match filter.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    result
}

/// Groups quotations by supplier email, busiest suppliers first
pub fn group_by_supplier(quotations: &[MaterialQuotation]) -> Vec<SupplierSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut suppliers: HashMap<String, SupplierSummary> = HashMap::new();

    for q in quotations {
        let email = q.get_supplier_email();
        let created_at = q.get_created_at();
        let summary = suppliers.entry(email.clone()).or_insert_with(|| {
            order.push(email.clone());
            SupplierSummary {
                supplier_email: email.clone(),
                supplier_company: q.get_supplier_company(),
                supplier_name: q.get_supplier_name(),
                supplier_country: q.get_supplier_country(),
                materials: Vec::new(),
                total_quotations: 0,
                first_quotation: created_at,
                last_quotation: created_at,
            }
        });

        summary.materials.push(SupplierMaterial {
            material_name: q.get_material_name(),
            material_category: q.get_material_category(),
            unit_price: q.get_unit_price(),
            currency: q.get_currency(),
            unit: q.get_unit(),
            created_at,
        });
        summary.total_quotations += 1;
        summary.first_quotation = summary.first_quotation.min(created_at);
        summary.last_quotation = summary.last_quotation.max(created_at);
    }

    let mut result: Vec<SupplierSummary> = order
        .into_iter()
        .filter_map(|email| suppliers.remove(&email))
        .collect();
    // Stable sort keeps first-seen order among equal totals
    result.sort_by(|a, b| b.total_quotations.cmp(&a.total_quotations));
    result
}

/// Counts and distributions over a set of quotations
pub fn quotation_stats(quotations: &[MaterialQuotation], now: DateTime<Utc>) -> QuotationStats {
    let cutoff = now - Duration::days(30);
    let mut stats = QuotationStats {
        total_quotations: quotations.len(),
        unique_suppliers: 0,
        unique_materials: 0,
        unique_countries: 0,
        recent_quotations_30d: 0,
        by_currency: BTreeMap::new(),
        by_country: BTreeMap::new(),
        by_category: BTreeMap::new(),
    };

    let mut suppliers = HashSet::new();
    let mut materials = HashSet::new();
    let mut countries = HashSet::new();

    for q in quotations {
        suppliers.insert(q.get_supplier_email());
        materials.insert(q.get_material_name());
        *stats.by_currency.entry(q.get_currency()).or_default() += 1;
        if let Some(country) = q.get_supplier_country() {
            countries.insert(country.clone());
            *stats.by_country.entry(country).or_default() += 1;
        }
        if let Some(category) = q.get_material_category() {
            *stats.by_category.entry(category).or_default() += 1;
        }
        if q.get_created_at() > cutoff {
            stats.recent_quotations_30d += 1;
        }
    }

    stats.unique_suppliers = suppliers.len();
    stats.unique_materials = materials.len();
    stats.unique_countries = countries.len();
    stats
}

/// The cheapest price of one material in one country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPrice {
    pub country: String,
    pub price_id: String,
    pub unit_amount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialCountryPrices {
    pub material_id: String,
    pub material_name: String,
    pub quantity: f64,
    pub best_by_country: Vec<BestPrice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySavings {
    pub baseline_country: String,
    pub candidate_country: String,
    pub baseline_total: f64,
    pub candidate_total: f64,
    /// Positive when the candidate country is cheaper
    pub savings: f64,
    pub savings_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectComparison {
    pub materials: Vec<MaterialCountryPrices>,
    pub totals_by_country: BTreeMap<String, f64>,
    pub savings: Option<CountrySavings>,
}

/// Compares the cost of a project's materials between sourcing countries
///
/// For every material the cheapest price per country counts, using the
/// converted amount when there is one. A material without a quantity counts
/// once. Prices without a country are ignored.
pub fn project_comparison(
    materials: &[Material],
    prices: &[Price],
    baseline_country: Option<&str>,
    candidate_country: Option<&str>,
) -> ProjectComparison {
    let mut by_material: HashMap<String, Vec<&Price>> = HashMap::new();
    for price in prices {
        by_material
            .entry(price.get_material_id())
            .or_default()
            .push(price);
    }

    let mut totals_by_country: BTreeMap<String, f64> = BTreeMap::new();
    let mut rows = Vec::with_capacity(materials.len());

    for material in materials {
        let quantity = material.get_quantity().filter(|q| *q > 0.0).unwrap_or(1.0);
        let mut best: BTreeMap<String, &Price> = BTreeMap::new();
        for price in by_material.get(&material.get_id()).into_iter().flatten() {
            let Some(country) = price.get_country() else {
                continue;
            };
            let replace = match best.get(&country) {
                Some(current) => price.comparable_amount() < current.comparable_amount(),
                None => true,
            };
            if replace {
                best.insert(country, price);
            }
        }

        let best_by_country: Vec<BestPrice> = best
            .into_iter()
            .map(|(country, price)| {
                let unit_amount = price.comparable_amount();
                let total = unit_amount * quantity;
                *totals_by_country.entry(country.clone()).or_default() += total;
                BestPrice {
                    country,
                    price_id: price.get_id(),
                    unit_amount,
                    total,
                }
            })
            .collect();

        rows.push(MaterialCountryPrices {
            material_id: material.get_id(),
            material_name: material.get_name(),
            quantity,
            best_by_country,
        });
    }

    let savings = match (baseline_country, candidate_country) {
        (Some(baseline), Some(candidate)) => {
            let baseline_total = totals_by_country.get(baseline).copied().unwrap_or(0.0);
            let candidate_total = totals_by_country.get(candidate).copied().unwrap_or(0.0);
            let savings = baseline_total - candidate_total;
            Some(CountrySavings {
                baseline_country: baseline.to_string(),
                candidate_country: candidate.to_string(),
                baseline_total,
                candidate_total,
                savings,
                savings_percentage: if baseline_total > 0.0 {
                    round2(savings / baseline_total * 100.0)
                } else {
                    0.0
                },
            })
        }
        _ => None,
    };

    ProjectComparison {
        materials: rows,
        totals_by_country,
        savings,
    }
}
