use crate::db::DbPool;
use crate::models::ExchangeRate;
use crate::pricing::ExchangeRateTable;
use crate::schema::exchange_rates;
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{instrument, warn};

/// Stores the rate of a currency pair, replacing any previous rate
#[instrument(skip(pool))]
pub fn upsert_exchange_rate(pool: &DbPool, from_currency: &str, to_currency: &str, rate: f64) -> Result<ExchangeRate> {
    let conn = &mut pool.get()?;

    let new_rate = ExchangeRate::new(from_currency, to_currency, rate);

    diesel::insert_into(exchange_rates::table)
        .values(&new_rate)
        .on_conflict((exchange_rates::from_currency, exchange_rates::to_currency))
        .do_update()
        .set((
            exchange_rates::rate.eq(rate),
            exchange_rates::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    let stored = exchange_rates::table
        .filter(exchange_rates::from_currency.eq(new_rate.get_from_currency()))
        .filter(exchange_rates::to_currency.eq(new_rate.get_to_currency()))
        .first::<ExchangeRate>(conn)?;

    Ok(stored)
}

/// Lists every stored rate by currency pair
#[instrument(skip(pool))]
pub fn list_exchange_rates(pool: &DbPool) -> Result<Vec<ExchangeRate>> {
    let conn = &mut pool.get()?;
    load_rates(conn)
}

fn load_rates(conn: &mut SqliteConnection) -> Result<Vec<ExchangeRate>> {
    let result = exchange_rates::table
        .order((exchange_rates::from_currency.asc(), exchange_rates::to_currency.asc()))
        .load::<ExchangeRate>(conn)?;
    Ok(result)
}

#[instrument(skip(pool))]
pub fn delete_exchange_rate(pool: &DbPool, rate_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(exchange_rates::table.find(rate_id)).execute(conn)?;

    Ok(deleted > 0)
}

/// Builds the conversion table from the stored rates
///
/// When the rates cannot be read the static fallback table is returned
/// instead, so conversions keep working.
pub fn rate_table(pool: &DbPool) -> ExchangeRateTable {
    match pool.get().map_err(anyhow::Error::from).and_then(|mut conn| load_rates(&mut conn)) {
        Ok(rows) => ExchangeRateTable::from_rows(&rows),
        Err(e) => {
            warn!("Could not load exchange rates, using fallback table: {:#}", e);
            ExchangeRateTable::fallback()
        }
    }
}

/// Same as [`rate_table`] on the caller's connection
pub(crate) fn rate_table_on(conn: &mut SqliteConnection) -> ExchangeRateTable {
    match load_rates(conn) {
        Ok(rows) => ExchangeRateTable::from_rows(&rows),
        Err(e) => {
            warn!("Could not load exchange rates, using fallback table: {:#}", e);
            ExchangeRateTable::fallback()
        }
    }
}
