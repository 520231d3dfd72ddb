use crate::db::DbPool;
use crate::models::{
    JsonValue, Material, MaterialQuotation, Notification, Project, QUOTE_RECEIVED, QuoteStatus,
    QuotedMaterial, RequestMaterial, RequestStatus, SupplierIdentity, SupplierQuote,
    SupplierRequest, SupplierToken, TokenStatus,
};
use crate::pricing::{MarginPolicy, SendSummary, plan_client_prices};
use crate::repo::{Conflict, find_or_create_supplier, insert_price, rate_table_on};
use crate::schema::{
    material_quotations, materials, notifications, projects, supplier_quotes, supplier_requests,
    supplier_tokens,
};
use anyhow::{Result, anyhow};
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Records a supplier's answer to a request
///
/// A supplier answering the same request again (same email) replaces its
/// previous answer, unless that answer was already forwarded to the client.
/// The request moves to `in_progress` and its progress counter is updated.
///
/// ### Errors
///
/// Returns a [`Conflict`] if the supplier's previous answer was already sent
/// to the client
#[instrument(skip(pool, request, supplier, quoted_materials), fields(request_id = %request.get_id(), email = %supplier.email))]
pub fn submit_quote(
    pool: &DbPool,
    request: &SupplierRequest,
    supplier: SupplierIdentity,
    quoted_materials: Vec<QuotedMaterial>,
) -> Result<SupplierQuote> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| record_answer(conn, request, supplier, quoted_materials))
}

/// Records a supplier's answer given through its personal link
///
/// Behaves like [`submit_quote`], and also marks the link as submitted,
/// stores who answered through it and clears its pending updates.
#[instrument(skip(pool, request, link, supplier, quoted_materials), fields(link_id = %link.get_id(), email = %supplier.email))]
pub fn submit_quote_via_link(
    pool: &DbPool,
    request: &SupplierRequest,
    link: &SupplierToken,
    supplier: SupplierIdentity,
    quoted_materials: Vec<QuotedMaterial>,
) -> Result<SupplierQuote> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        diesel::update(supplier_tokens::table.find(link.get_id()))
            .set((
                supplier_tokens::status.eq(TokenStatus::Submitted.as_str()),
                supplier_tokens::supplier_name.eq(Some(supplier.name.clone())),
                supplier_tokens::supplier_email.eq(Some(supplier.email.clone())),
                supplier_tokens::supplier_company.eq(&supplier.company),
                supplier_tokens::supplier_country.eq(Some(supplier.country.clone())),
                supplier_tokens::has_pending_updates.eq(false),
                supplier_tokens::pending_updates.eq(JsonValue(serde_json::Value::Array(vec![]))),
                supplier_tokens::submitted_at.eq(Some(Utc::now().naive_utc())),
            ))
            .execute(conn)?;

        record_answer(conn, request, supplier, quoted_materials)
    })
}

fn record_answer(
    conn: &mut SqliteConnection,
    request: &SupplierRequest,
    supplier: SupplierIdentity,
    quoted_materials: Vec<QuotedMaterial>,
) -> Result<SupplierQuote> {
    let existing = supplier_quotes::table
        .filter(supplier_quotes::supplier_request_id.eq(request.get_id()))
        .filter(supplier_quotes::supplier_email.eq(&supplier.email))
        .first::<SupplierQuote>(conn)
        .optional()?;

    let quote_id = match existing {
        Some(previous) if previous.is_sent_to_client() => {
            return Err(Conflict("This quote was already forwarded to the client".to_string()).into());
        }
        Some(previous) => {
            diesel::update(supplier_quotes::table.find(previous.get_id()))
                .set((
                    supplier_quotes::supplier_name.eq(&supplier.name),
                    supplier_quotes::supplier_company.eq(&supplier.company),
                    supplier_quotes::supplier_country.eq(&supplier.country),
                    supplier_quotes::supplier_phone.eq(&supplier.phone),
                    supplier_quotes::quoted_materials.eq(JsonValue(serde_json::to_value(&quoted_materials)?)),
                    supplier_quotes::status.eq(QuoteStatus::Submitted.as_str()),
                    supplier_quotes::submitted_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            info!(quote_id = %previous.get_id(), "Replaced previous answer");
            previous.get_id()
        }
        None => {
            let quote = SupplierQuote::new(request.get_id(), supplier, &quoted_materials);
            diesel::insert_into(supplier_quotes::table)
                .values(&quote)
                .execute(conn)?;
            quote.get_id()
        }
    };

    let filled = count_filled_on(conn, &request.get_id(), &request.get_materials())?;
    diesel::update(supplier_requests::table.find(request.get_id()))
        .set((
            supplier_requests::filled_materials.eq(filled),
            supplier_requests::status.eq(RequestStatus::InProgress.as_str()),
        ))
        .execute(conn)?;

    let quote = supplier_quotes::table
        .find(&quote_id)
        .first::<SupplierQuote>(conn)?;
    Ok(quote)
}

/// Counts how many of `materials` received a price from any supplier
/// answering the request
pub(crate) fn count_filled_on(
    conn: &mut SqliteConnection,
    request_id: &str,
    materials: &[RequestMaterial],
) -> Result<i32> {
    let quotes = supplier_quotes::table
        .filter(supplier_quotes::supplier_request_id.eq(request_id))
        .load::<SupplierQuote>(conn)?;

    let priced: HashSet<String> = quotes
        .iter()
        .flat_map(|q| q.get_quoted_materials())
        .filter(|m| m.has_prices())
        .map(|m| m.id)
        .collect();

    Ok(materials.iter().filter(|m| priced.contains(&m.id)).count() as i32)
}

#[instrument(skip(pool))]
pub fn get_quote(pool: &DbPool, quote_id: &str) -> Result<Option<SupplierQuote>> {
    let conn = &mut pool.get()?;

    let result = supplier_quotes::table
        .find(quote_id)
        .first::<SupplierQuote>(conn)
        .optional()?;

    Ok(result)
}

/// Lists quotes newest first, optionally only those answering one request
#[instrument(skip(pool))]
pub fn list_quotes(pool: &DbPool, request_id: Option<&str>) -> Result<Vec<SupplierQuote>> {
    let conn = &mut pool.get()?;

    let mut query = supplier_quotes::table
        .order(supplier_quotes::submitted_at.desc())
        .into_boxed();
    if let Some(request_id) = request_id {
        query = query.filter(supplier_quotes::supplier_request_id.eq(request_id));
    }

    Ok(query.load::<SupplierQuote>(conn)?)
}

/// Stores the margin an administrator plans to apply to a quote
///
/// ### Errors
///
/// Returns a [`Conflict`] if the quote was already sent to the client
#[instrument(skip(pool))]
pub fn update_quote_margin(pool: &DbPool, quote_id: &str, margin: f64) -> Result<Option<SupplierQuote>> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(quote) = supplier_quotes::table
            .find(quote_id)
            .first::<SupplierQuote>(conn)
            .optional()?
        else {
            return Ok(None);
        };
        if quote.is_sent_to_client() {
            return Err(Conflict("The margin of a quote sent to the client cannot change".to_string()).into());
        }

        diesel::update(supplier_quotes::table.find(quote_id))
            .set(supplier_quotes::admin_margin.eq(Some(margin)))
            .execute(conn)?;

        Ok(Some(supplier_quotes::table.find(quote_id).first::<SupplierQuote>(conn)?))
    })
}

/// Settings of the brokerage run that come from configuration
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    /// Name of the supplier the client prices are attributed to
    pub broker_supplier_name: String,

    /// Rate used for currencies with no stored rate to FCFA
    pub fallback_rate: f64,
}

/// Forwards a supplier quote to the client who requested it
///
/// In a single transaction: finds or creates the broker supplier, inserts
/// one client price per matched quoted price (marked up and converted),
/// archives the raw supplier prices as material quotations, marks the quote
/// as sent and notifies the owner of the request.
///
/// ### Returns
///
/// A summary of what was written, or None if the quote does not exist
///
/// ### Errors
///
/// Returns a [`Conflict`] if the quote was already sent
#[instrument(skip(pool, policy, settings))]
pub fn send_quote_to_client(
    pool: &DbPool,
    quote_id: &str,
    policy: &MarginPolicy,
    settings: &BrokerSettings,
) -> Result<Option<SendSummary>> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(quote) = supplier_quotes::table
            .find(quote_id)
            .first::<SupplierQuote>(conn)
            .optional()?
        else {
            return Ok(None);
        };
        if quote.is_sent_to_client() {
            return Err(Conflict("Quote already sent to the client".to_string()).into());
        }

        let request = supplier_requests::table
            .find(quote.get_supplier_request_id())
            .first::<SupplierRequest>(conn)?;
        let project = projects::table
            .find(request.get_project_id())
            .first::<Project>(conn)
            .optional()?
            .ok_or_else(|| anyhow!("Project {} of request {} is missing", request.get_project_id(), request.get_id()))?;
        let project_materials = materials::table
            .filter(materials::project_id.eq(project.get_id()))
            .load::<Material>(conn)?;

        let broker = find_or_create_supplier(conn, &settings.broker_supplier_name)?;
        let rates = rate_table_on(conn);

        let plan = plan_client_prices(
            &quote,
            &project.get_id(),
            &project_materials,
            policy,
            &rates,
            settings.fallback_rate,
            &broker.get_id(),
        );
        if !plan.unmatched.is_empty() {
            warn!(unmatched = ?plan.unmatched, "Quoted materials without a project counterpart");
        }

        for price in &plan.prices {
            insert_price(conn, &price.material_id, price.draft.clone())?;
        }

        let archived: Vec<MaterialQuotation> = plan
            .quotations
            .iter()
            .cloned()
            .map(MaterialQuotation::new)
            .collect();
        if !archived.is_empty() {
            diesel::insert_into(material_quotations::table)
                .values(&archived)
                .execute(conn)?;
        }

        let marked = diesel::update(
            supplier_quotes::table
                .filter(supplier_quotes::id.eq(quote.get_id()))
                .filter(supplier_quotes::status.ne(QuoteStatus::SentToClient.as_str())),
        )
        .set((
            supplier_quotes::status.eq(QuoteStatus::SentToClient.as_str()),
            supplier_quotes::admin_margin.eq(Some(policy.global_margin)),
            supplier_quotes::sent_to_client_at.eq(Some(Utc::now().naive_utc())),
        ))
        .execute(conn)?;
        if marked == 0 {
            return Err(Conflict("Quote already sent to the client".to_string()).into());
        }

        let notification = Notification::new(
            request.get_owner_id(),
            QUOTE_RECEIVED,
            "New quotation received".to_string(),
            format!(
                "Prices for {} materials were added to your project \"{}\"",
                plan.matched_materials,
                project.get_name()
            ),
            Some(format!("/projects/{}", project.get_id())),
            serde_json::json!({
                "project_id": project.get_id(),
                "quote_id": quote.get_id(),
                "material_count": plan.matched_materials,
            }),
        );
        diesel::insert_into(notifications::table)
            .values(&notification)
            .execute(conn)?;

        info!(
            prices = plan.prices.len(),
            materials = plan.matched_materials,
            "Quote sent to client"
        );

        Ok(Some(SendSummary {
            quote_id: quote.get_id(),
            prices_inserted: plan.prices.len(),
            quotations_archived: archived.len(),
            material_count: plan.matched_materials,
            unmatched_materials: plan.unmatched,
            notification_id: Some(notification.get_id()),
        }))
    })
}

#[cfg(test)]
mod tests;
