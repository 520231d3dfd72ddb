use crate::db::DbPool;
use crate::models::{
    Material, MaterialComment, Project, RequestMaterial, RequestOptions, RequestStatus,
    SupplierRequest,
};
use crate::repo::insert_links_on;
use crate::schema::{material_comments, materials, supplier_requests};
use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Freezes the materials of a project, with their live comments, into the
/// shape sent to suppliers
fn snapshot_materials(materials: Vec<Material>, comments: Vec<MaterialComment>) -> Vec<RequestMaterial> {
    let mut by_material: HashMap<String, Vec<MaterialComment>> = HashMap::new();
    for comment in comments {
        by_material.entry(comment.get_material_id()).or_default().push(comment);
    }

    materials
        .into_iter()
        .map(|m| RequestMaterial {
            comments: by_material
                .remove(&m.get_id())
                .unwrap_or_default()
                .iter()
                .map(MaterialComment::to_snapshot)
                .collect(),
            images: m.get_images(),
            id: m.get_id(),
            name: m.get_name(),
            description: m.get_description(),
            category: m.get_category(),
            quantity: m.get_quantity(),
            unit: m.get_unit(),
        })
        .collect()
}

/// Loads the current materials of a project with their live comments, in
/// the order they were added
pub(crate) fn load_snapshot_on(conn: &mut SqliteConnection, project_id: &str) -> Result<Vec<RequestMaterial>> {
    let project_materials = materials::table
        .filter(materials::project_id.eq(project_id))
        .order((materials::created_at.asc(), materials::id.asc()))
        .load::<Material>(conn)?;

    let material_ids: Vec<String> = project_materials.iter().map(|m| m.get_id()).collect();
    let comments = material_comments::table
        .filter(material_comments::material_id.eq_any(&material_ids))
        .filter(material_comments::is_deleted.eq(false))
        .order(material_comments::created_at.asc())
        .load::<MaterialComment>(conn)?;

    Ok(snapshot_materials(project_materials, comments))
}

/// Creates a request for quotation on a project
///
/// The project's current materials and their non-deleted comments are
/// copied into the request, and one personal link is created for each
/// requested supplier.
#[instrument(skip(pool, project, options), fields(project_id = %project.get_id()))]
pub fn create_supplier_request(
    pool: &DbPool,
    project: &Project,
    owner_id: &str,
    options: RequestOptions,
) -> Result<SupplierRequest> {
    let conn = &mut pool.get()?;

    let request = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let snapshot = load_snapshot_on(conn, &project.get_id())?;
        let request = SupplierRequest::new(project.get_id(), owner_id.to_string(), &snapshot, options);

        diesel::insert_into(supplier_requests::table)
            .values(&request)
            .execute(conn)?;
        insert_links_on(conn, &request, request.get_num_suppliers())?;

        Ok(request)
    })?;

    info!(
        request_number = %request.get_request_number(),
        materials = request.get_total_materials(),
        "Created supplier request"
    );
    Ok(request)
}

#[instrument(skip(pool))]
pub fn get_supplier_request(pool: &DbPool, request_id: &str) -> Result<Option<SupplierRequest>> {
    let conn = &mut pool.get()?;

    let result = supplier_requests::table
        .find(request_id)
        .first::<SupplierRequest>(conn)
        .optional()?;

    Ok(result)
}

/// Looks a request up by the token of its public link
#[instrument(skip(pool, token))]
pub fn get_request_by_token(pool: &DbPool, token: &str) -> Result<Option<SupplierRequest>> {
    let conn = &mut pool.get()?;

    let result = supplier_requests::table
        .filter(supplier_requests::public_token.eq(token))
        .first::<SupplierRequest>(conn)
        .optional()?;

    Ok(result)
}

/// Lists requests newest first, optionally only those of one owner
#[instrument(skip(pool))]
pub fn list_supplier_requests(pool: &DbPool, owner_id: Option<&str>) -> Result<Vec<SupplierRequest>> {
    let conn = &mut pool.get()?;

    let mut query = supplier_requests::table
        .order(supplier_requests::created_at.desc())
        .into_boxed();
    if let Some(owner_id) = owner_id {
        query = query.filter(supplier_requests::owner_id.eq(owner_id));
    }

    Ok(query.load::<SupplierRequest>(conn)?)
}

/// Moves a request to another lifecycle status
///
/// ### Returns
///
/// The updated request, or None if it does not exist
#[instrument(skip(pool))]
pub fn update_request_status(pool: &DbPool, request_id: &str, status: RequestStatus) -> Result<Option<SupplierRequest>> {
    let conn = &mut pool.get()?;

    diesel::update(supplier_requests::table.find(request_id))
        .set(supplier_requests::status.eq(status.as_str()))
        .execute(conn)?;

    let result = supplier_requests::table
        .find(request_id)
        .first::<SupplierRequest>(conn)
        .optional()?;

    Ok(result)
}
