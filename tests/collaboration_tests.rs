/// Integration tests for shared projects
///
/// Covers material editing, comments, invitations and the notifications
/// they produce.

mod common;

use axum::http::StatusCode;
use common::{call, create_material, create_project, create_test_app};
use serde_json::json;

#[tokio::test]
async fn test_material_lifecycle() {
    let app = create_test_app();
    let project_id = create_project(&app, "owner-1", "Villa Ngor").await;
    let cement_id = create_material(&app, &project_id, "Ciment", 50.0, "sac").await;
    let tiles_id = create_material(&app, &project_id, "Carrelage 45x45", 80.0, "m2").await;

    let (status, material) = call(
        &app,
        "PATCH",
        &format!("/materials/{}", cement_id),
        Some(json!({ "quantity": 75.0, "description": "CPJ 42.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(material["quantity"], 75.0);
    assert_eq!(material["name"], "Ciment");

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/projects/{}/materials/categories", project_id),
        Some(json!({ "category_map": {
            cement_id.clone(): "Gros œuvre",
            tiles_id.clone(): "Revêtements",
            "not-a-material": "Divers"
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated"], 2);

    let (_, material) = call(&app, "GET", &format!("/materials/{}", tiles_id), None).await;
    assert_eq!(material["category"], "Revêtements");

    let (status, _) = call(&app, "DELETE", &format!("/materials/{}", tiles_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, materials) = call(&app, "GET", &format!("/projects/{}/materials", project_id), None).await;
    assert_eq!(materials.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "GET", &format!("/materials/{}", tiles_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_are_soft_deleted() {
    let app = create_test_app();
    let project_id = create_project(&app, "owner-1", "Villa Ngor").await;
    let material_id = create_material(&app, &project_id, "Fenêtre alu", 12.0, "u").await;
    let uri = format!("/materials/{}/comments", material_id);

    let (status, comment) = call(
        &app,
        "POST",
        &uri,
        Some(json!({ "user_name": "Awa", "user_email": "awa@example.com", "comment": "  Double vitrage  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["comment"], "Double vitrage");
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "POST",
        &uri,
        Some(json!({ "user_name": "Awa", "user_email": "awa@example.com", "comment": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, comments) = call(&app, "GET", &uri, None).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "DELETE", &format!("/comments/{}", comment_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "DELETE", &format!("/comments/{}", comment_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, comments) = call(&app, "GET", &uri, None).await;
    assert!(comments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invitation_acceptance_notifies_owner() {
    let app = create_test_app();
    let project_id = create_project(&app, "owner-1", "Immeuble Mermoz").await;
    let collaborators_uri = format!("/projects/{}/collaborators", project_id);

    let (status, invitation) = call(
        &app,
        "POST",
        &collaborators_uri,
        Some(json!({ "email": "Moussa@Example.com", "role": "viewer", "invited_by": "owner-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invitation["status"], "pending");
    let collaborator_id = invitation["id"].as_str().unwrap().to_string();

    // Nobody else has an invitation to accept
    let (status, _) = call(
        &app,
        "POST",
        &format!("{}/accept", collaborators_uri),
        Some(json!({ "email": "someone@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, accepted) = call(
        &app,
        "POST",
        &format!("{}/accept", collaborators_uri),
        Some(json!({ "email": "moussa@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (_, notifications) = call(&app, "GET", "/notifications?user_id=owner-1&unread_only=true", None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["data"]["email"], "moussa@example.com");
    let notification_id = notifications[0]["id"].as_str().unwrap().to_string();

    let (status, read) = call(&app, "POST", &format!("/notifications/{}/read", notification_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["read"], true);

    let (_, unread) = call(&app, "GET", "/notifications?user_id=owner-1&unread_only=true", None).await;
    assert!(unread.as_array().unwrap().is_empty());

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("{}/{}", collaborators_uri, collaborator_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, collaborators) = call(&app, "GET", &collaborators_uri, None).await;
    assert!(collaborators.as_array().unwrap().is_empty());
}
