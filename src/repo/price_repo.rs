use crate::db::DbPool;
use crate::models::{Price, PriceDraft};
use crate::schema::{materials, prices};
use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::instrument;

/// Records a price against a material
///
/// ### Errors
///
/// Returns an error if the material (or the referenced supplier) does not
/// exist or the insert fails
#[instrument(skip(pool, draft), fields(currency = %draft.currency, amount = draft.amount))]
pub fn add_price(pool: &DbPool, material_id: &str, draft: PriceDraft) -> Result<Price> {
    let conn = &mut pool.get()?;
    insert_price(conn, material_id, draft)
}

/// Inserts a price on the caller's connection
pub(crate) fn insert_price(conn: &mut SqliteConnection, material_id: &str, draft: PriceDraft) -> Result<Price> {
    let price = Price::new(material_id.to_string(), draft);

    diesel::insert_into(prices::table)
        .values(&price)
        .execute(conn)?;

    Ok(price)
}

/// Lists the prices of a material, cheapest first
#[instrument(skip(pool))]
pub fn list_prices(pool: &DbPool, material_id: &str) -> Result<Vec<Price>> {
    let conn = &mut pool.get()?;

    let mut result = prices::table
        .filter(prices::material_id.eq(material_id))
        .load::<Price>(conn)?;

    result.sort_by(|a, b| a.comparable_amount().total_cmp(&b.comparable_amount()));
    Ok(result)
}

/// Lists every price recorded on the materials of a project
#[instrument(skip(pool))]
pub fn list_project_prices(pool: &DbPool, project_id: &str) -> Result<Vec<Price>> {
    let conn = &mut pool.get()?;

    let result = prices::table
        .inner_join(materials::table)
        .filter(materials::project_id.eq(project_id))
        .select(Price::as_select())
        .order(prices::created_at.asc())
        .load::<Price>(conn)?;

    Ok(result)
}
