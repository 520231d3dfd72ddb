//! Common test utilities for Procura integration tests
//!
//! This file contains shared functions and utilities for all integration tests,
//! including test application setup and helpers for creating common test objects
//! through the API.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use procura::{
    ai::{AiError, CompletionProvider},
    config::base_config,
    create_app,
    db::init_pool,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// A completion provider answering every prompt with the same text, or
/// failing when it has none
pub struct CannedCompletion(pub Option<String>);

#[async_trait]
impl CompletionProvider for CannedCompletion {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, AiError> {
        self.0.clone().ok_or(AiError::NotConfigured)
    }
}

/// Creates a test application with an in-memory SQLite database
///
/// This helper function:
/// 1. Creates a shared in-memory SQLite database unique to the test
/// 2. Runs migrations to set up the schema
/// 3. Creates an Axum application with the database and default configuration
///
/// The completion service is unavailable; see [`create_test_app_with_ai`].
pub fn create_test_app() -> Router {
    create_test_app_with_ai(CannedCompletion(None))
}

/// Creates a test application whose completion service is `ai`
pub fn create_test_app_with_ai(ai: CannedCompletion) -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).unwrap();

    {
        let conn = &mut pool.get().unwrap();
        procura::run_migrations(conn).unwrap();
    }

    create_app(AppState {
        pool: Arc::new(pool),
        ai: Arc::new(ai),
        config: Arc::new(base_config(None)),
    })
}

/// Sends a request and returns the status with the JSON body
///
/// An empty body comes back as `Value::Null`.
pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates a project via the API and returns its id
pub async fn create_project(app: &Router, owner_id: &str, name: &str) -> String {
    let (status, project) = call(
        app,
        "POST",
        "/projects",
        Some(json!({ "owner_id": owner_id, "name": name, "project_type": "Villa" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    project["id"].as_str().unwrap().to_string()
}

/// Adds a material to a project via the API and returns its id
pub async fn create_material(app: &Router, project_id: &str, name: &str, quantity: f64, unit: &str) -> String {
    let (status, material) = call(
        app,
        "POST",
        &format!("/projects/{}/materials", project_id),
        Some(json!({ "name": name, "quantity": quantity, "unit": unit })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    material["id"].as_str().unwrap().to_string()
}

/// Stores an exchange rate via the API
pub async fn set_rate(app: &Router, from: &str, to: &str, rate: f64) {
    let (status, _) = call(
        app,
        "POST",
        "/exchange-rates",
        Some(json!({ "from_currency": from, "to_currency": to, "rate": rate })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
