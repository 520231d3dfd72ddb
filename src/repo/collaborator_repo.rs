use crate::db::DbPool;
use crate::models::{
    COLLABORATION_ACCEPTED, CollaboratorRole, CollaboratorStatus, Notification, Project,
    ProjectCollaborator,
};
use crate::repo::{Conflict, is_unique_violation};
use crate::schema::{notifications, project_collaborators};
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use tracing::{info, instrument};

/// Invites an email onto a project
///
/// ### Errors
///
/// Returns a [`Conflict`] if the email was already invited to the project
#[instrument(skip(pool))]
pub fn invite_collaborator(
    pool: &DbPool,
    project_id: &str,
    email: &str,
    role: CollaboratorRole,
    invited_by: String,
) -> Result<ProjectCollaborator> {
    let conn = &mut pool.get()?;

    let invitation = ProjectCollaborator::new(project_id.to_string(), email, role, invited_by);

    match diesel::insert_into(project_collaborators::table)
        .values(&invitation)
        .execute(conn)
    {
        Ok(_) => Ok(invitation),
        Err(e) if is_unique_violation(&e) => Err(Conflict(format!(
            "{} is already invited to this project",
            invitation.get_email()
        ))
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Lists the collaborators of a project in invitation order
#[instrument(skip(pool))]
pub fn list_collaborators(pool: &DbPool, project_id: &str) -> Result<Vec<ProjectCollaborator>> {
    let conn = &mut pool.get()?;

    let result = project_collaborators::table
        .filter(project_collaborators::project_id.eq(project_id))
        .order(project_collaborators::invited_at.asc())
        .load::<ProjectCollaborator>(conn)?;

    Ok(result)
}

/// Accepts the pending invitation of `email` on `project`
///
/// The project owner is notified in the same transaction.
///
/// ### Returns
///
/// The accepted invitation, or None if there was no pending invitation
#[instrument(skip(pool, project), fields(project_id = %project.get_id()))]
pub fn accept_invitation(pool: &DbPool, project: &Project, email: &str) -> Result<Option<ProjectCollaborator>> {
    let conn = &mut pool.get()?;
    let email = email.trim().to_lowercase();

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let pending = project_collaborators::table
            .filter(project_collaborators::project_id.eq(project.get_id()))
            .filter(project_collaborators::email.eq(&email))
            .filter(project_collaborators::status.eq(CollaboratorStatus::Pending.as_str()))
            .first::<ProjectCollaborator>(conn)
            .optional()?;

        let Some(invitation) = pending else {
            return Ok(None);
        };

        diesel::update(project_collaborators::table.find(invitation.get_id()))
            .set((
                project_collaborators::status.eq(CollaboratorStatus::Accepted.as_str()),
                project_collaborators::accepted_at.eq(Some(Utc::now().naive_utc())),
            ))
            .execute(conn)?;

        let notification = Notification::new(
            project.get_owner_id(),
            COLLABORATION_ACCEPTED,
            "Invitation accepted".to_string(),
            format!("{} accepted your invitation to \"{}\"", email, project.get_name()),
            Some(format!("/projects/{}", project.get_id())),
            serde_json::json!({ "project_id": project.get_id(), "email": email }),
        );
        diesel::insert_into(notifications::table)
            .values(&notification)
            .execute(conn)?;

        let accepted = project_collaborators::table
            .find(invitation.get_id())
            .first::<ProjectCollaborator>(conn)?;

        info!(collaborator_id = %accepted.get_id(), "Invitation accepted");
        Ok(Some(accepted))
    })
}

/// Removes a collaborator from a project
#[instrument(skip(pool))]
pub fn remove_collaborator(pool: &DbPool, project_id: &str, collaborator_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(
        project_collaborators::table
            .filter(project_collaborators::id.eq(collaborator_id))
            .filter(project_collaborators::project_id.eq(project_id)),
    )
    .execute(conn)?;

    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use crate::repo::list_notifications;
    use crate::test_utils::{seed_project, setup_test_db};

    #[test]
    fn test_invite_and_list() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");

        let invitation = invite_collaborator(
            &pool,
            &project.get_id(),
            " Awa@Example.com ",
            CollaboratorRole::Editor,
            "owner-1".to_string(),
        )
        .unwrap();

        assert_eq!(invitation.get_email(), "awa@example.com");
        assert_eq!(invitation.get_status(), "pending");
        assert_eq!(list_collaborators(&pool, &project.get_id()).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_invitation_is_a_conflict() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        invite_collaborator(&pool, &project.get_id(), "awa@example.com", CollaboratorRole::Viewer, "owner-1".to_string()).unwrap();

        let err = invite_collaborator(&pool, &project.get_id(), "AWA@example.com", CollaboratorRole::Editor, "owner-1".to_string())
            .unwrap_err();

        assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
    }

    #[test]
    fn test_accept_invitation_notifies_owner() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        invite_collaborator(&pool, &project.get_id(), "awa@example.com", CollaboratorRole::Editor, "owner-1".to_string()).unwrap();

        let accepted = accept_invitation(&pool, &project, "AWA@example.com").unwrap().unwrap();

        assert_eq!(accepted.get_status(), "accepted");
        assert!(accepted.get_accepted_at().is_some());
        let notifications = list_notifications(&pool, "owner-1", false).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].get_kind(), COLLABORATION_ACCEPTED);

        // Already accepted: nothing pending any more
        assert!(accept_invitation(&pool, &project, "awa@example.com").unwrap().is_none());
    }

    #[test]
    fn test_remove_collaborator() {
        let pool = setup_test_db();
        let project = seed_project(&pool, "owner-1", "Villa");
        let invitation = invite_collaborator(&pool, &project.get_id(), "awa@example.com", CollaboratorRole::Viewer, "owner-1".to_string()).unwrap();

        assert!(!remove_collaborator(&pool, "other-project", &invitation.get_id()).unwrap());
        assert!(remove_collaborator(&pool, &project.get_id(), &invitation.get_id()).unwrap());
        assert!(list_collaborators(&pool, &project.get_id()).unwrap().is_empty());
    }
}
