use crate::db::DbPool;
use crate::dto::{LinkSyncState, SyncStatus, SyncSummary};
use crate::models::{JsonValue, SupplierRequest, SupplierToken, TokenStatus, detect_material_changes};
use crate::repo::{count_filled_on, load_snapshot_on};
use crate::schema::{supplier_requests, supplier_tokens};
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{info, instrument};

/// Inserts `count` fresh pending links on a request
pub(crate) fn insert_links_on(
    conn: &mut SqliteConnection,
    request: &SupplierRequest,
    count: i32,
) -> Result<Vec<SupplierToken>> {
    let links: Vec<SupplierToken> = (0..count.max(0))
        .map(|_| {
            SupplierToken::new(
                request.get_id(),
                request.get_materials_version(),
                request.get_expires_at(),
            )
        })
        .collect();
    if links.is_empty() {
        return Ok(links);
    }

    diesel::insert_into(supplier_tokens::table)
        .values(&links)
        .execute(conn)?;

    Ok(links)
}

/// Lists the personal links of a request, oldest first
#[instrument(skip(pool))]
pub fn list_supplier_tokens(pool: &DbPool, request_id: &str) -> Result<Vec<SupplierToken>> {
    let conn = &mut pool.get()?;

    let links = supplier_tokens::table
        .filter(supplier_tokens::supplier_request_id.eq(request_id))
        .order((supplier_tokens::created_at.asc(), supplier_tokens::id.asc()))
        .load::<SupplierToken>(conn)?;

    Ok(links)
}

/// Looks a personal link up by its token
#[instrument(skip(pool, token))]
pub fn get_link_by_token(pool: &DbPool, token: &str) -> Result<Option<SupplierToken>> {
    let conn = &mut pool.get()?;

    let result = supplier_tokens::table
        .filter(supplier_tokens::token.eq(token))
        .first::<SupplierToken>(conn)
        .optional()?;

    Ok(result)
}

/// Hands out `count` more links on a request and raises its supplier count
/// accordingly
#[instrument(skip(pool, request), fields(request_id = %request.get_id()))]
pub fn add_supplier_tokens(pool: &DbPool, request: &SupplierRequest, count: i32) -> Result<Vec<SupplierToken>> {
    let conn = &mut pool.get()?;

    let links = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let links = insert_links_on(conn, request, count)?;
        diesel::update(supplier_requests::table.find(request.get_id()))
            .set(supplier_requests::num_suppliers.eq(supplier_requests::num_suppliers + count))
            .execute(conn)?;
        Ok(links)
    })?;

    info!(added = links.len(), "Added supplier links");
    Ok(links)
}

/// Revokes one link of a request
///
/// The request's supplier count follows the number of links left.
///
/// ### Returns
///
/// Whether a link of that request was deleted
#[instrument(skip(pool))]
pub fn delete_supplier_token(pool: &DbPool, request_id: &str, token_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let deleted = diesel::delete(
            supplier_tokens::table
                .filter(supplier_tokens::id.eq(token_id))
                .filter(supplier_tokens::supplier_request_id.eq(request_id)),
        )
        .execute(conn)?;
        if deleted == 0 {
            return Ok(false);
        }

        let remaining = supplier_tokens::table
            .filter(supplier_tokens::supplier_request_id.eq(request_id))
            .count()
            .get_result::<i64>(conn)?;
        diesel::update(supplier_requests::table.find(request_id))
            .set(supplier_requests::num_suppliers.eq(remaining as i32))
            .execute(conn)?;

        Ok(true)
    })
}

/// Counts one more view of a link
///
/// The first view is remembered, and a pending link becomes `viewed`.
///
/// ### Returns
///
/// The updated link, or None if it does not exist
#[instrument(skip(pool))]
pub fn record_link_view(pool: &DbPool, token_id: &str) -> Result<Option<SupplierToken>> {
    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(link) = supplier_tokens::table
            .find(token_id)
            .first::<SupplierToken>(conn)
            .optional()?
        else {
            return Ok(None);
        };

        let now = Utc::now().naive_utc();
        let status = if link.get_status() == TokenStatus::Pending.as_str() {
            TokenStatus::Viewed.as_str().to_string()
        } else {
            link.get_status()
        };
        let first_viewed_at = link.get_first_viewed_at().map(|at| at.naive_utc()).unwrap_or(now);

        diesel::update(supplier_tokens::table.find(token_id))
            .set((
                supplier_tokens::view_count.eq(supplier_tokens::view_count + 1),
                supplier_tokens::first_viewed_at.eq(Some(first_viewed_at)),
                supplier_tokens::last_viewed_at.eq(Some(now)),
                supplier_tokens::status.eq(status),
            ))
            .execute(conn)?;

        let updated = supplier_tokens::table
            .find(token_id)
            .first::<SupplierToken>(conn)?;
        Ok(Some(updated))
    })
}

/// Refreshes a request's snapshot from the current materials of its project
///
/// The materials version goes up by one. Every link of the request moves to
/// the new version and gets the list of materials that were added or whose
/// description or images changed; links with such changes are flagged as
/// having pending updates. The progress counter is recomputed against the
/// new snapshot.
#[instrument(skip(pool, request), fields(request_id = %request.get_id()))]
pub fn sync_request_materials(pool: &DbPool, request: &SupplierRequest) -> Result<SyncSummary> {
    let conn = &mut pool.get()?;

    let summary = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let now = Utc::now();
        let snapshot = load_snapshot_on(conn, &request.get_project_id())?;
        let changes = detect_material_changes(&request.get_materials(), &snapshot, now);
        let version = request.get_materials_version() + 1;
        let filled = count_filled_on(conn, &request.get_id(), &snapshot)?;

        diesel::update(supplier_requests::table.find(request.get_id()))
            .set((
                supplier_requests::materials_data.eq(JsonValue(serde_json::to_value(&snapshot)?)),
                supplier_requests::total_materials.eq(snapshot.len() as i32),
                supplier_requests::filled_materials.eq(filled),
                supplier_requests::materials_version.eq(version),
                supplier_requests::last_materials_update.eq(Some(now.naive_utc())),
            ))
            .execute(conn)?;

        let links = supplier_tokens::table
            .filter(supplier_tokens::supplier_request_id.eq(request.get_id()))
            .load::<SupplierToken>(conn)?;
        diesel::update(supplier_tokens::table.filter(supplier_tokens::supplier_request_id.eq(request.get_id())))
            .set((
                supplier_tokens::materials_version.eq(version),
                supplier_tokens::last_synced_at.eq(Some(now.naive_utc())),
                supplier_tokens::has_pending_updates.eq(!changes.is_empty()),
                supplier_tokens::pending_updates.eq(JsonValue(serde_json::to_value(&changes)?)),
            ))
            .execute(conn)?;

        Ok(SyncSummary {
            version,
            changed_materials: changes.len(),
            suppliers_synced: links.len(),
        })
    })?;

    info!(
        version = summary.version,
        changed = summary.changed_materials,
        "Synced request materials"
    );
    Ok(summary)
}

/// Reports which links of a request still show an older snapshot
#[instrument(skip(pool, request), fields(request_id = %request.get_id()))]
pub fn request_sync_status(pool: &DbPool, request: &SupplierRequest) -> Result<SyncStatus> {
    let current_version = request.get_materials_version();
    let suppliers: Vec<LinkSyncState> = list_supplier_tokens(pool, &request.get_id())?
        .iter()
        .map(|link| LinkSyncState::new(link, current_version))
        .collect();

    Ok(SyncStatus {
        current_version,
        last_update: request.get_last_materials_update(),
        needs_sync_count: suppliers.iter().filter(|s| s.needs_sync).count(),
        suppliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::UpdateMaterialDto;
    use crate::models::{QuotedMaterial, QuotedPrice, RequestOptions, SupplierIdentity};
    use crate::repo::{create_supplier_request, get_supplier_request, submit_quote_via_link, update_material};
    use crate::test_utils::{seed_material, seed_project, setup_test_db};

    fn request_with_links(pool: &DbPool, links: i32) -> SupplierRequest {
        let project = seed_project(pool, "owner-1", "Villa");
        seed_material(pool, &project.get_id(), "Ciment", Some(100.0));
        let options = RequestOptions {
            num_suppliers: links,
            ..Default::default()
        };
        create_supplier_request(pool, &project, "owner-1", options).unwrap()
    }

    #[test]
    fn test_add_and_delete_links_track_supplier_count() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 2);

        let added = add_supplier_tokens(&pool, &request, 3).unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(list_supplier_tokens(&pool, &request.get_id()).unwrap().len(), 5);
        let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
        assert_eq!(stored.get_num_suppliers(), 5);

        assert!(delete_supplier_token(&pool, &request.get_id(), &added[0].get_id()).unwrap());
        assert!(!delete_supplier_token(&pool, &request.get_id(), &added[0].get_id()).unwrap());
        let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
        assert_eq!(stored.get_num_suppliers(), 4);
    }

    #[test]
    fn test_delete_link_of_another_request_is_refused() {
        let pool = setup_test_db();
        let first = request_with_links(&pool, 1);
        let second = request_with_links(&pool, 1);
        let foreign = list_supplier_tokens(&pool, &second.get_id()).unwrap().remove(0);

        assert!(!delete_supplier_token(&pool, &first.get_id(), &foreign.get_id()).unwrap());
        assert_eq!(list_supplier_tokens(&pool, &second.get_id()).unwrap().len(), 1);
    }

    #[test]
    fn test_record_link_view() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 1);
        let link = list_supplier_tokens(&pool, &request.get_id()).unwrap().remove(0);

        let first = record_link_view(&pool, &link.get_id()).unwrap().unwrap();
        assert_eq!(first.get_status(), "viewed");
        assert_eq!(first.get_view_count(), 1);
        let first_seen = first.get_first_viewed_at().unwrap();

        let second = record_link_view(&pool, &link.get_id()).unwrap().unwrap();
        assert_eq!(second.get_view_count(), 2);
        assert_eq!(second.get_first_viewed_at(), Some(first_seen));
        assert!(second.get_last_viewed_at().unwrap() >= first_seen);

        assert!(record_link_view(&pool, "missing").unwrap().is_none());
    }

    #[test]
    fn test_viewing_a_submitted_link_keeps_it_submitted() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 1);
        let link = list_supplier_tokens(&pool, &request.get_id()).unwrap().remove(0);
        let supplier = SupplierIdentity {
            name: "Moussa".to_string(),
            email: "moussa@example.com".to_string(),
            company: Some("BTP Sahel".to_string()),
            country: "Senegal".to_string(),
            phone: None,
        };
        submit_quote_via_link(&pool, &request, &link, supplier, vec![]).unwrap();

        let viewed = record_link_view(&pool, &link.get_id()).unwrap().unwrap();
        assert_eq!(viewed.get_status(), "submitted");
        assert_eq!(viewed.display_name().as_deref(), Some("BTP Sahel"));
    }

    #[test]
    fn test_sync_flags_links_with_changed_materials() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 2);
        seed_material(&pool, &request.get_project_id(), "Sable", Some(5.0));

        let summary = sync_request_materials(&pool, &request).unwrap();
        assert_eq!(summary, SyncSummary { version: 2, changed_materials: 1, suppliers_synced: 2 });

        let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
        assert_eq!(stored.get_materials_version(), 2);
        assert_eq!(stored.get_total_materials(), 2);
        assert!(stored.get_last_materials_update().is_some());

        let links = list_supplier_tokens(&pool, &request.get_id()).unwrap();
        for link in &links {
            assert_eq!(link.get_materials_version(), 2);
            assert!(link.has_pending_updates());
            let updates = link.get_pending_updates();
            assert_eq!(updates.len(), 1);
            assert_eq!(updates[0].material_name, "Sable");
        }
    }

    #[test]
    fn test_sync_without_changes_clears_flags() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 1);

        let summary = sync_request_materials(&pool, &request).unwrap();
        assert_eq!(summary.changed_materials, 0);

        let link = list_supplier_tokens(&pool, &request.get_id()).unwrap().remove(0);
        assert!(!link.has_pending_updates());
        assert_eq!(link.get_materials_version(), 2);
    }

    #[test]
    fn test_sync_recounts_filled_materials_against_new_snapshot() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 1);
        let link = list_supplier_tokens(&pool, &request.get_id()).unwrap().remove(0);
        let cement = request.get_materials().remove(0);
        let priced = QuotedMaterial {
            id: cement.id.clone(),
            name: cement.name.clone(),
            category: None,
            quantity: Some(100.0),
            unavailable: false,
            prices: vec![QuotedPrice {
                amount: 5000.0,
                currency: "FCFA".to_string(),
                country: None,
                unit: None,
                moq: None,
                notes: None,
                variations: vec![],
            }],
        };
        let supplier = SupplierIdentity {
            name: "Moussa".to_string(),
            email: "moussa@example.com".to_string(),
            company: None,
            country: "Senegal".to_string(),
            phone: None,
        };
        submit_quote_via_link(&pool, &request, &link, supplier, vec![priced]).unwrap();
        update_material(&pool, &cement.id, UpdateMaterialDto {
            description: Some("CPJ 52.5".to_string()),
            ..Default::default()
        })
        .unwrap();

        sync_request_materials(&pool, &request).unwrap();

        let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
        assert_eq!(stored.get_filled_materials(), 1);
        let link = list_supplier_tokens(&pool, &request.get_id()).unwrap().remove(0);
        assert_eq!(link.get_pending_updates()[0].change_type, crate::models::MaterialChange::Updated);
    }

    #[test]
    fn test_request_sync_status() {
        let pool = setup_test_db();
        let request = request_with_links(&pool, 2);
        sync_request_materials(&pool, &request).unwrap();
        let stale = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
        add_supplier_tokens(&pool, &request, 1).unwrap();

        let status = request_sync_status(&pool, &stale).unwrap();
        assert_eq!(status.current_version, 2);
        assert_eq!(status.suppliers.len(), 3);
        assert_eq!(status.needs_sync_count, 1);
        assert!(status.last_update.is_some());
    }
}
