use crate::db::DbPool;
use crate::dto::{PageQuery, UpdateProjectDto};
use crate::models::Project;
use crate::schema::projects;
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, instrument};

/// Creates a new project in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner_id` - The tenant owning the project
/// * `name` - The name of the project
/// * `project_type` - Optional kind of construction work
///
/// ### Returns
///
/// A Result containing the newly created Project if successful
#[instrument(skip(pool))]
pub fn create_project(
    pool: &DbPool,
    owner_id: String,
    name: String,
    project_type: Option<String>,
) -> Result<Project> {
    let conn = &mut pool.get()?;

    let new_project = Project::new(owner_id, name, project_type);

    diesel::insert_into(projects::table)
        .values(&new_project)
        .execute(conn)?;

    debug!(project_id = %new_project.get_id(), "Created project");
    Ok(new_project)
}

/// Retrieves a project by its ID
///
/// ### Returns
///
/// A Result containing an Option with the Project if found, or None if not found
#[instrument(skip(pool))]
pub fn get_project(pool: &DbPool, project_id: &str) -> Result<Option<Project>> {
    let conn = &mut pool.get()?;

    let result = projects::table
        .find(project_id)
        .first::<Project>(conn)
        .optional()?;

    Ok(result)
}

/// Lists one page of the projects of `owner_id`, most recently updated first
///
/// ### Returns
///
/// The page of projects and the total number of projects the owner has
#[instrument(skip(pool))]
pub fn list_projects(pool: &DbPool, owner_id: &str, page: &PageQuery) -> Result<(Vec<Project>, i64)> {
    let conn = &mut pool.get()?;

    let total: i64 = projects::table
        .filter(projects::owner_id.eq(owner_id))
        .count()
        .get_result(conn)?;

    let rows = projects::table
        .filter(projects::owner_id.eq(owner_id))
        .order((projects::updated_at.desc(), projects::id.asc()))
        .limit(page.limit())
        .offset(page.offset())
        .load::<Project>(conn)?;

    Ok((rows, total))
}

/// Applies a partial update to a project
///
/// ### Returns
///
/// The updated project, or None if it does not exist
#[instrument(skip(pool))]
pub fn update_project(pool: &DbPool, project_id: &str, update: UpdateProjectDto) -> Result<Option<Project>> {
    let conn = &mut pool.get()?;

    let now = Utc::now().naive_utc();
    let updated = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let exists = projects::table
            .find(project_id)
            .select(projects::id)
            .first::<String>(conn)
            .optional()?;
        if exists.is_none() {
            return Ok(false);
        }

        if let Some(name) = update.name {
            diesel::update(projects::table.find(project_id))
                .set(projects::name.eq(name))
                .execute(conn)?;
        }
        if let Some(project_type) = update.project_type {
            diesel::update(projects::table.find(project_id))
                .set(projects::project_type.eq(Some(project_type)))
                .execute(conn)?;
        }
        diesel::update(projects::table.find(project_id))
            .set(projects::updated_at.eq(now))
            .execute(conn)?;
        Ok(true)
    })?;

    if !updated {
        return Ok(None);
    }

    let project = projects::table.find(project_id).first::<Project>(conn)?;
    Ok(Some(project))
}

/// Deletes a project and, through the foreign keys, everything under it
///
/// ### Returns
///
/// Whether a project was deleted
#[instrument(skip(pool))]
pub fn delete_project(pool: &DbPool, project_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(projects::table.find(project_id)).execute(conn)?;

    Ok(deleted > 0)
}
