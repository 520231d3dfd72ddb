use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::db::DbPool;
use crate::dto::{AcceptInvitationDto, CreateCommentDto, InviteCollaboratorDto, NotificationQuery};
use crate::errors::ApiError;
use crate::models::{MaterialComment, Notification, ProjectCollaborator};
use crate::repo;

/// Handler for commenting on a material
///
/// This function handles POST requests to `/materials/{id}/comments`.
#[instrument(skip(pool, payload), fields(user_email = %payload.user_email))]
pub async fn add_comment_handler(
    State(pool): State<Arc<DbPool>>,
    Path(material_id): Path<String>,
    Json(payload): Json<CreateCommentDto>,
) -> Result<Json<MaterialComment>, ApiError> {
    if payload.comment.trim().is_empty() {
        return Err(ApiError::Validation("Comment cannot be empty".to_string()));
    }

    repo::get_material(&pool, &material_id)?
        .ok_or(ApiError::NotFound("Material"))?;

    let comment = repo::add_comment(
        &pool,
        &material_id,
        payload.user_name,
        payload.user_email,
        payload.comment.trim().to_string(),
    )?;
    Ok(Json(comment))
}

/// Handler for the comments of a material, oldest first
#[instrument(skip(pool))]
pub async fn list_comments_handler(
    State(pool): State<Arc<DbPool>>,
    Path(material_id): Path<String>,
) -> Result<Json<Vec<MaterialComment>>, ApiError> {
    Ok(Json(repo::list_comments(&pool, &material_id)?))
}

#[instrument(skip(pool))]
pub async fn delete_comment_handler(
    State(pool): State<Arc<DbPool>>,
    Path(comment_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    if !repo::delete_comment(&pool, &comment_id)? {
        return Err(ApiError::NotFound("Comment"));
    }
    Ok(Json(()))
}

/// Handler for inviting someone onto a project
///
/// This function handles POST requests to `/projects/{id}/collaborators`.
/// Inviting the same email twice is a 409.
#[instrument(skip(pool, payload), fields(role = %payload.role))]
pub async fn invite_collaborator_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Json(payload): Json<InviteCollaboratorDto>,
) -> Result<Json<ProjectCollaborator>, ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }

    repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    let invitation = repo::invite_collaborator(&pool, &project_id, &payload.email, payload.role, payload.invited_by)?;

    info!("Invited collaborator {}", invitation.get_id());
    Ok(Json(invitation))
}

#[instrument(skip(pool))]
pub async fn list_collaborators_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectCollaborator>>, ApiError> {
    Ok(Json(repo::list_collaborators(&pool, &project_id)?))
}

/// Handler for accepting a pending invitation
///
/// This function handles POST requests to `/projects/{id}/collaborators/accept`.
/// The project owner gets a notification.
#[instrument(skip(pool, payload))]
pub async fn accept_invitation_handler(
    State(pool): State<Arc<DbPool>>,
    Path(project_id): Path<String>,
    Json(payload): Json<AcceptInvitationDto>,
) -> Result<Json<ProjectCollaborator>, ApiError> {
    let project = repo::get_project(&pool, &project_id)?
        .ok_or(ApiError::NotFound("Project"))?;

    let accepted = repo::accept_invitation(&pool, &project, &payload.email)?
        .ok_or(ApiError::NotFound("Pending invitation"))?;

    Ok(Json(accepted))
}

/// Handler for removing a collaborator
///
/// This function handles DELETE requests to
/// `/projects/{id}/collaborators/{collaborator_id}`.
#[instrument(skip(pool))]
pub async fn remove_collaborator_handler(
    State(pool): State<Arc<DbPool>>,
    Path((project_id, collaborator_id)): Path<(String, String)>,
) -> Result<Json<()>, ApiError> {
    if !repo::remove_collaborator(&pool, &project_id, &collaborator_id)? {
        return Err(ApiError::NotFound("Collaborator"));
    }

    info!("Removed collaborator {}", collaborator_id);
    Ok(Json(()))
}

/// Handler for the notifications of a user, newest first
///
/// This function handles GET requests to `/notifications?user_id=...&unread_only=...`.
#[instrument(skip(pool))]
pub async fn list_notifications_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(repo::list_notifications(&pool, &query.user_id, query.unread_only)?))
}

#[instrument(skip(pool))]
pub async fn mark_notification_read_handler(
    State(pool): State<Arc<DbPool>>,
    Path(notification_id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let notification = repo::mark_notification_read(&pool, &notification_id)?
        .ok_or(ApiError::NotFound("Notification"))?;

    Ok(Json(notification))
}
