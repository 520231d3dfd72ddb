//! Boundary with the hosted language model.
//!
//! The model is only used for classification and extraction: guessing the
//! layout of a spreadsheet, putting materials into trade categories and
//! suggesting missing materials. Every call goes through
//! [`CompletionProvider`] so tests can swap in a canned provider.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod categorize;
pub mod openai;
pub mod structure;
pub mod suggest;

pub use categorize::{
    BTP_CATEGORIES, CategorizationResult, MaterialDescriptor, categorize_materials, keyword_category,
};
pub use openai::OpenAiCompatibleProvider;
pub use structure::{ColumnMapping, FileStructure, analyze_file_structure};
pub use suggest::{Priority, Suggestion, SuggestionResult, suggest_materials};

#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured for the completion service
    #[error("Completion service is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion service answered with a non-success status
    #[error("Completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model's answer could not be used
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// A service that turns a prompt into text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Completes `prompt` under the `system` instruction
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError>;
}

/// Strips markdown code fences and returns the outermost `{...}` block
pub fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let unfenced = match trimmed.find("```") {
        Some(start) => {
            let after = &trimmed[start + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => trimmed,
    };
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&unfenced[start..=end])
}

/// Parses the JSON object inside a model answer
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    let json = extract_json_object(text)
        .ok_or_else(|| AiError::InvalidResponse("no JSON object in model answer".to_string()))?;
    serde_json::from_str(json).map_err(|e| AiError::InvalidResponse(e.to_string()))
}
