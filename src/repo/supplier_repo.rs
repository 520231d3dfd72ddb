use crate::db::DbPool;
use crate::models::Supplier;
use crate::schema::suppliers;
use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{info, instrument};

/// Creates a new supplier in the database
#[instrument(skip(pool, contact_info))]
pub fn create_supplier(
    pool: &DbPool,
    name: String,
    email: Option<String>,
    country: Option<String>,
    contact_info: Option<serde_json::Value>,
) -> Result<Supplier> {
    let conn = &mut pool.get()?;

    let new_supplier = Supplier::new(name, email, country, contact_info);

    diesel::insert_into(suppliers::table)
        .values(&new_supplier)
        .execute(conn)?;

    Ok(new_supplier)
}

#[instrument(skip(pool))]
pub fn get_supplier(pool: &DbPool, supplier_id: &str) -> Result<Option<Supplier>> {
    let conn = &mut pool.get()?;

    let result = suppliers::table
        .find(supplier_id)
        .first::<Supplier>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all suppliers by name
#[instrument(skip(pool))]
pub fn list_suppliers(pool: &DbPool) -> Result<Vec<Supplier>> {
    let conn = &mut pool.get()?;

    let result = suppliers::table
        .order(suppliers::name.asc())
        .load::<Supplier>(conn)?;

    Ok(result)
}

/// Returns the supplier called `name`, ignoring case, creating it if needed
///
/// Runs on the caller's connection so it can take part in a transaction.
pub(crate) fn find_or_create_supplier(conn: &mut SqliteConnection, name: &str) -> Result<Supplier> {
    // LIKE is case-insensitive for ASCII in SQLite; the exact comparison
    // below drops wildcard matches and handles non-ASCII names
    let candidates = suppliers::table
        .filter(suppliers::name.like(name))
        .load::<Supplier>(conn)?;

    let wanted = name.to_lowercase();
    if let Some(existing) = candidates
        .into_iter()
        .find(|s| s.get_name().to_lowercase() == wanted)
    {
        return Ok(existing);
    }

    let supplier = Supplier::new(name.to_string(), None, None, None);
    diesel::insert_into(suppliers::table)
        .values(&supplier)
        .execute(conn)?;

    info!(supplier_id = %supplier.get_id(), "Created supplier {}", name);
    Ok(supplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_create_and_get_supplier() {
        let pool = setup_test_db();

        let supplier = create_supplier(
            &pool,
            "Foshan Tiles".to_string(),
            Some("sales@foshan-tiles.cn".to_string()),
            Some("China".to_string()),
            Some(serde_json::json!({"wechat": "foshan"})),
        )
        .unwrap();

        let retrieved = get_supplier(&pool, &supplier.get_id()).unwrap().unwrap();
        assert_eq!(retrieved.get_name(), "Foshan Tiles");
        assert_eq!(retrieved.get_contact_info()["wechat"], "foshan");
        assert!(get_supplier(&pool, "missing").unwrap().is_none());
    }

    #[test]
    fn test_list_suppliers_sorted_by_name() {
        let pool = setup_test_db();
        create_supplier(&pool, "Zhejiang Pipes".to_string(), None, None, None).unwrap();
        create_supplier(&pool, "Anhui Steel".to_string(), None, None, None).unwrap();

        let names: Vec<String> = list_suppliers(&pool).unwrap().iter().map(|s| s.get_name()).collect();
        assert_eq!(names, vec!["Anhui Steel".to_string(), "Zhejiang Pipes".to_string()]);
    }

    #[test]
    fn test_find_or_create_supplier_ignores_case() {
        let pool = setup_test_db();
        let existing = create_supplier(&pool, "Procura Sourcing".to_string(), None, None, None).unwrap();

        let conn = &mut pool.get().unwrap();
        let found = find_or_create_supplier(conn, "procura sourcing").unwrap();
        assert_eq!(found.get_id(), existing.get_id());

        let created = find_or_create_supplier(conn, "Other Broker").unwrap();
        assert_ne!(created.get_id(), existing.get_id());
        let again = find_or_create_supplier(conn, "OTHER BROKER").unwrap();
        assert_eq!(again.get_id(), created.get_id());
    }
}
