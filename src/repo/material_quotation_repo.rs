use crate::db::DbPool;
use crate::dto::{
    CreateQuotationsDto, QuotationFilterOptions, QuotationListQuery, QuotationSort,
    UpdateQuotationDto,
};
use crate::models::{MaterialQuotation, QuotationStatus};
use crate::pricing::{SETTLEMENT_CURRENCY, SortOrder};
use crate::repo::rate_table_on;
use crate::schema::material_quotations;
use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

type BoxedQuotations<'a> = material_quotations::BoxedQuery<'a, Sqlite>;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The quotations matching every filter of `query`, unordered and unpaged
///
/// Without an explicit status only active quotations match; `all` matches
/// every status.
fn filtered(query: &QuotationListQuery) -> BoxedQuotations<'_> {
    let mut q = material_quotations::table.into_boxed();
    if let Some(status) = query.status.status() {
        q = q.filter(material_quotations::status.eq(status.as_str()));
    }

    // LIKE is case-insensitive for ASCII in SQLite
    if let Some(material) = non_empty(&query.material) {
        q = q.filter(material_quotations::material_name.like(format!("%{}%", material)));
    }
    if let Some(supplier) = non_empty(&query.supplier) {
        let pattern = format!("%{}%", supplier);
        q = q.filter(
            material_quotations::supplier_email
                .like(pattern.clone())
                .or(material_quotations::supplier_company.like(pattern.clone()))
                .or(material_quotations::supplier_name.like(pattern)),
        );
    }
    if !query.countries.is_empty() {
        q = q.filter(material_quotations::supplier_country.eq_any(query.countries.clone()));
    }
    if let Some(category) = non_empty(&query.category) {
        q = q.filter(material_quotations::material_category.eq(category));
    }
    q
}

fn sorted(q: BoxedQuotations<'_>, sort_by: QuotationSort, order: SortOrder) -> BoxedQuotations<'_> {
    use crate::schema::material_quotations::dsl::*;

    let q = match (sort_by, order) {
        (QuotationSort::CreatedAt, SortOrder::Asc) => q.order(created_at.asc()),
        (QuotationSort::CreatedAt, SortOrder::Desc) => q.order(created_at.desc()),
        (QuotationSort::UnitPrice, SortOrder::Asc) => q.order(unit_price.asc()),
        (QuotationSort::UnitPrice, SortOrder::Desc) => q.order(unit_price.desc()),
        (QuotationSort::MaterialName, SortOrder::Asc) => q.order(material_name.asc()),
        (QuotationSort::MaterialName, SortOrder::Desc) => q.order(material_name.desc()),
        (QuotationSort::SupplierCountry, SortOrder::Asc) => q.order(supplier_country.asc()),
        (QuotationSort::SupplierCountry, SortOrder::Desc) => q.order(supplier_country.desc()),
    };
    q.then_order_by(id.asc())
}

/// Lists one window of the quotation archive
///
/// ### Returns
///
/// The matching quotations and how many match in total
#[instrument(skip(pool), fields(query = %query))]
pub fn list_quotations(pool: &DbPool, query: &QuotationListQuery) -> Result<(Vec<MaterialQuotation>, i64)> {
    let conn = &mut pool.get()?;

    let total: i64 = filtered(query).count().get_result(conn)?;

    let rows = sorted(filtered(query), query.sort_by, query.sort_order)
        .limit(query.limit())
        .offset(query.offset())
        .load::<MaterialQuotation>(conn)?;

    debug!("Found {} of {} quotations", rows.len(), total);
    Ok((rows, total))
}

/// Distinct materials, categories and countries among active quotations,
/// each sorted alphabetically
#[instrument(skip(pool))]
pub fn quotation_filter_options(pool: &DbPool) -> Result<QuotationFilterOptions> {
    let conn = &mut pool.get()?;

    let rows: Vec<(String, Option<String>, Option<String>)> = material_quotations::table
        .filter(material_quotations::status.eq(QuotationStatus::Active.as_str()))
        .select((
            material_quotations::material_name,
            material_quotations::material_category,
            material_quotations::supplier_country,
        ))
        .load(conn)?;

    let mut materials = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut countries = BTreeSet::new();
    for (material, category, country) in rows {
        materials.insert(material);
        categories.extend(category.filter(|c| !c.is_empty()));
        countries.extend(country.filter(|c| !c.is_empty()));
    }

    Ok(QuotationFilterOptions {
        materials: materials.into_iter().collect(),
        categories: categories.into_iter().collect(),
        countries: countries.into_iter().collect(),
    })
}

/// Every active quotation, newest first
///
/// Feeds the comparison, by-supplier and statistics views.
#[instrument(skip(pool))]
pub fn list_active_quotations(pool: &DbPool) -> Result<Vec<MaterialQuotation>> {
    let conn = &mut pool.get()?;

    let result = material_quotations::table
        .filter(material_quotations::status.eq(QuotationStatus::Active.as_str()))
        .order((material_quotations::created_at.desc(), material_quotations::id.asc()))
        .load::<MaterialQuotation>(conn)?;

    Ok(result)
}

#[instrument(skip(pool))]
pub fn get_quotation(pool: &DbPool, quotation_id: &str) -> Result<Option<MaterialQuotation>> {
    let conn = &mut pool.get()?;

    let result = material_quotations::table
        .find(quotation_id)
        .first::<MaterialQuotation>(conn)
        .optional()?;

    Ok(result)
}

/// Archives a batch of quotations entered by hand
///
/// The batch's supplier identity, when given, replaces the one on each
/// entry, and its source quote is stamped on every entry. Entries without
/// a converted price get one from the stored rates to FCFA, or from
/// `fallback_rate` when no rate is stored.
#[instrument(skip(pool, batch), fields(count = batch.quotations.len()))]
pub fn create_quotations(pool: &DbPool, batch: CreateQuotationsDto, fallback_rate: f64) -> Result<Vec<MaterialQuotation>> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let rates = rate_table_on(conn);

        let records: Vec<MaterialQuotation> = batch
            .quotations
            .into_iter()
            .map(|mut draft| {
                if let Some(supplier) = &batch.supplier {
                    draft.supplier_email = supplier.email.clone();
                    draft.supplier_name = Some(supplier.name.clone());
                    draft.supplier_country = Some(supplier.country.clone());
                    if supplier.company.is_some() {
                        draft.supplier_company = supplier.company.clone();
                    }
                }
                if batch.source_quote_id.is_some() {
                    draft.source_quote_id = batch.source_quote_id.clone();
                }
                if draft.converted_price_fcfa.is_none() {
                    let rate = rates.effective_rate(&draft.currency, SETTLEMENT_CURRENCY, fallback_rate);
                    draft.converted_price_fcfa = Some(draft.unit_price * rate);
                    draft.exchange_rate_used = Some(rate);
                }
                MaterialQuotation::new(draft)
            })
            .collect();

        if !records.is_empty() {
            diesel::insert_into(material_quotations::table)
                .values(&records)
                .execute(conn)?;
        }

        info!("Archived {} quotations", records.len());
        Ok(records)
    })
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = material_quotations)]
struct QuotationChanges {
    status: Option<String>,
    notes: Option<String>,
}

/// Changes the status or notes of a quotation
///
/// ### Returns
///
/// The quotation, or None if it does not exist
#[instrument(skip(pool))]
pub fn update_quotation(pool: &DbPool, quotation_id: &str, update: UpdateQuotationDto) -> Result<Option<MaterialQuotation>> {
    let conn = &mut pool.get()?;

    let changes = QuotationChanges {
        status: update.status.map(|s| s.as_str().to_string()),
        notes: update.notes,
    };
    if changes.status.is_some() || changes.notes.is_some() {
        diesel::update(material_quotations::table.find(quotation_id))
            .set(&changes)
            .execute(conn)?;
    }

    let result = material_quotations::table
        .find(quotation_id)
        .first::<MaterialQuotation>(conn)
        .optional()?;

    Ok(result)
}
