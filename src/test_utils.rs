use crate::*;
use async_trait::async_trait;
use proptest::prelude::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use diesel::RunQueryDsl;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::ai::{AiError, CompletionProvider};
use crate::config::base_config;
use crate::models::{Material, MaterialDraft, Project};

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Enables foreign key constraints (done by the pool on every connection)
/// 3. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Use a unique shared in-memory database for each test.
    // Plain ":memory:" gives each connection its own separate database,
    // so migrations run on one connection wouldn't be visible on others.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");
    drop(conn);

    Arc::new(pool)
}

/// Builds application state around `pool` with a completion provider that
/// always fails
pub fn test_state(pool: Arc<db::DbPool>) -> AppState {
    test_state_with(pool, Arc::new(FakeCompletion::failing()))
}

/// Builds application state around `pool` and `ai`
pub fn test_state_with(pool: Arc<db::DbPool>, ai: Arc<dyn CompletionProvider>) -> AppState {
    AppState {
        pool,
        ai,
        config: Arc::new(base_config(None)),
    }
}

/// Creates a project owned by `owner_id`
pub fn seed_project(pool: &db::DbPool, owner_id: &str, name: &str) -> Project {
    repo::create_project(pool, owner_id.to_string(), name.to_string(), None)
        .expect("Failed to create project")
}

/// Creates a material named `name` in `project_id`
pub fn seed_material(pool: &db::DbPool, project_id: &str, name: &str, quantity: Option<f64>) -> Material {
    repo::create_material(
        pool,
        project_id,
        MaterialDraft {
            name: name.to_string(),
            quantity,
            ..Default::default()
        },
    )
    .expect("Failed to create material")
}

/// A completion provider returning canned text
///
/// Every prompt it receives is recorded so tests can check what was asked.
pub struct FakeCompletion {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    /// A provider answering every prompt with `answer`
    pub fn new(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails
    pub fn failing() -> Self {
        Self {
            answer: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(AiError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }),
        }
    }
}

use diesel::sql_types::Text;
use diesel::QueryableByName;

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tests the setup_test_db function
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. The database has the expected tables
/// 3. The application answers on top of it
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "projects", "materials", "suppliers", "prices", "exchange_rates",
        "supplier_requests", "supplier_tokens", "supplier_quotes", "material_quotations",
        "material_comments", "project_collaborators", "notifications",
        "__diesel_schema_migrations",
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    drop(conn);

    let app = create_app(test_state(pool.clone()));

    let request = Request::builder()
        .uri("/exchange-rates")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_foreign_keys_are_enforced() {
    let pool = setup_test_db();
    let result = repo::create_material(
        &pool,
        "missing-project",
        MaterialDraft {
            name: "Ciment".to_string(),
            ..Default::default()
        },
    );
    assert!(result.is_err());
}

/// Generates short strings with spaces, punctuation and accents
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9éèàœç_./'-]{0,24}"
}

/// Generates a realistic amount of money, up to two decimals
pub fn arb_amount() -> impl Strategy<Value = f64> {
    (1u32..10_000_000u32).prop_map(|v| v as f64 / 100.0)
}

/// Generates a margin percentage between -99 and 500, one decimal
pub fn arb_margin() -> impl Strategy<Value = f64> {
    (-990i32..=5000i32).prop_map(|v| v as f64 / 10.0)
}
