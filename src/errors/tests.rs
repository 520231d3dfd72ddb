use super::*;
use axum::body::to_bytes;
use axum::response::IntoResponse;

/// Helper to extract status code and body JSON from an ApiError response
async fn error_response(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_database_error_hides_detail() {
    let error = ApiError::Database(anyhow::anyhow!("connection refused"));
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_not_found_response() {
    let (status, body) = error_response(ApiError::NotFound("Project")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");
}

#[tokio::test]
async fn test_validation_response() {
    let msg = "Margin must be a finite number".to_string();
    let (status, body) = error_response(ApiError::Validation(msg.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg);
}

#[tokio::test]
async fn test_gone_response() {
    let (status, body) = error_response(ApiError::Gone("Request expired".to_string())).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "Request expired");
}

#[tokio::test]
async fn test_upstream_response() {
    let error = ApiError::from(AiError::InvalidResponse("missing columns".to_string()));
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("missing columns"));
}

#[tokio::test]
async fn test_conflict_is_recovered_from_anyhow() {
    let error: ApiError = anyhow::Error::new(Conflict("Quote already sent".to_string())).into();
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Quote already sent");
}

#[tokio::test]
async fn test_other_anyhow_errors_are_database_errors() {
    let error: ApiError = anyhow::anyhow!("disk I/O error").into();
    assert!(matches!(error, ApiError::Database(_)));
}
