use axum::{extract::State, Json};
use tracing::{instrument, info};

use crate::AppState;
use crate::ai::{
    CategorizationResult, SuggestionResult, analyze_file_structure, categorize_materials,
    suggest_materials,
};
use crate::dto::{AnalyzeFileDto, CategorizeDto, FileStructureResponse, SuggestDto};
use crate::errors::ApiError;

/// Handler locating the header row and key columns of an uploaded sheet
///
/// This function handles POST requests to `/ai/analyze-file`. The body
/// carries the first rows of the file as `fileSample`, each row an array of
/// cells.
///
/// ### Returns
///
/// The detected layout as `{ "config": ... }`. A missing or empty sample is
/// a 400; an unusable model answer is a 502.
#[instrument(skip(state, payload), fields(file_name = ?payload.file_name))]
pub async fn analyze_file_handler(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeFileDto>,
) -> Result<Json<FileStructureResponse>, ApiError> {
    let rows = payload
        .sample_rows()
        .ok_or_else(|| ApiError::Validation("fileSample must be a non-empty array of rows".to_string()))?;
    let file_name = payload.file_name.as_deref().unwrap_or("unknown");

    let config = analyze_file_structure(state.ai.as_ref(), rows, file_name).await?;

    Ok(Json(FileStructureResponse { config }))
}

/// Handler sorting materials into trade categories
///
/// This function handles POST requests to `/ai/categorize`. Keyword rules
/// answer first and the model only sees what they miss; when the model is
/// unavailable the rest falls back to `Divers`.
#[instrument(skip(state, payload), fields(count = payload.materials.len()))]
pub async fn categorize_handler(
    State(state): State<AppState>,
    Json(payload): Json<CategorizeDto>,
) -> Result<Json<CategorizationResult>, ApiError> {
    if payload.materials.is_empty() {
        return Err(ApiError::Validation("No materials to categorize".to_string()));
    }

    let result = categorize_materials(state.ai.as_ref(), &payload.materials, payload.project_type.as_deref()).await;

    info!(
        "Categorized {} materials ({} by keywords, {} by model)",
        result.stats.total, result.stats.by_keywords, result.stats.by_model
    );
    Ok(Json(result))
}

/// Handler suggesting materials a project is probably missing
///
/// This function handles POST requests to `/ai/suggest`.
#[instrument(skip(state, payload), fields(count = payload.materials.len()))]
pub async fn suggest_handler(
    State(state): State<AppState>,
    Json(payload): Json<SuggestDto>,
) -> Result<Json<SuggestionResult>, ApiError> {
    let result = suggest_materials(
        state.ai.as_ref(),
        &payload.materials,
        payload.project_type.as_deref(),
        payload.project_name.as_deref(),
    )
    .await;

    Ok(Json(result))
}
