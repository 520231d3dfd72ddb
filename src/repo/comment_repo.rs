use crate::db::DbPool;
use crate::models::MaterialComment;
use crate::schema::material_comments;
use anyhow::Result;
use diesel::prelude::*;
use tracing::instrument;

/// Adds a comment to a material
#[instrument(skip(pool, comment))]
pub fn add_comment(
    pool: &DbPool,
    material_id: &str,
    user_name: String,
    user_email: String,
    comment: String,
) -> Result<MaterialComment> {
    let conn = &mut pool.get()?;

    let new_comment = MaterialComment::new(material_id.to_string(), user_name, user_email, comment);

    diesel::insert_into(material_comments::table)
        .values(&new_comment)
        .execute(conn)?;

    Ok(new_comment)
}

/// Lists the comments of a material that were not deleted, oldest first
#[instrument(skip(pool))]
pub fn list_comments(pool: &DbPool, material_id: &str) -> Result<Vec<MaterialComment>> {
    let conn = &mut pool.get()?;

    let result = material_comments::table
        .filter(material_comments::material_id.eq(material_id))
        .filter(material_comments::is_deleted.eq(false))
        .order((material_comments::created_at.asc(), material_comments::id.asc()))
        .load::<MaterialComment>(conn)?;

    Ok(result)
}

/// Soft-deletes a comment
///
/// ### Returns
///
/// Whether a live comment was deleted
#[instrument(skip(pool))]
pub fn delete_comment(pool: &DbPool, comment_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let updated = diesel::update(
        material_comments::table
            .filter(material_comments::id.eq(comment_id))
            .filter(material_comments::is_deleted.eq(false)),
    )
    .set(material_comments::is_deleted.eq(true))
    .execute(conn)?;

    Ok(updated > 0)
}
