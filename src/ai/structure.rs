use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{AiError, CompletionProvider, parse_model_json};

const SYSTEM: &str = "You are a data structure expert. Answer ONLY with JSON.";

/// Column indexes (0-based) of the fields found in a spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub name: Option<usize>,
    #[serde(default)]
    pub description: Option<usize>,
    #[serde(default)]
    pub quantity: Option<usize>,
    #[serde(default)]
    pub unit: Option<usize>,
    #[serde(default)]
    pub price: Option<usize>,
    #[serde(default)]
    pub category: Option<usize>,
    #[serde(rename = "ref", default)]
    pub reference: Option<usize>,
}

/// The layout of an imported material list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStructure {
    pub header_row_index: usize,
    pub columns: ColumnMapping,
    #[serde(default)]
    pub confidence: Option<f64>,
}

fn build_prompt(sample: &[serde_json::Value], file_name: &str) -> Result<String, AiError> {
    let sample_json =
        serde_json::to_string(sample).map_err(|e| AiError::InvalidResponse(e.to_string()))?;
    Ok(format!(
        r#"Analyze the structure of this spreadsheet from a sample of its first rows.

FILE: {file_name}

SAMPLE (rows 0 to {last}):
```json
{sample_json}
```

1. Find the index of the header row, the row holding column titles such as
   "Désignation", "Prix", "Qté". Ignore project titles, dates and metadata
   above it. If no header is obvious, pick the most likely row.
2. Find the 0-based index of each key column:
   - name: "Désignation", "Libellé", "Description", "Article", "Matériau"
   - quantity: "Qté", "Quantité", "Nombre", "Qte"
   - unit: "Unité", "U", "Unit"
   - price: "Prix", "PU", "P.U.", "Prix Unitaire"
   - category: "Catégorie", "Lot", "Corps d'état"
   - ref: "Réf", "Code", "Numéro"

Expected JSON:
{{
  "headerRowIndex": 4,
  "columns": {{"name": 1, "description": 1, "quantity": 3, "unit": 2, "price": 4, "category": null, "ref": 0}},
  "confidence": 0.9
}}

Use null for a column you cannot find."#,
        last = sample.len().saturating_sub(1),
    ))
}

/// Asks the model where the header row and key columns of a spreadsheet are
///
/// `sample` holds the first rows of the file, each row an array of cells.
#[instrument(skip(provider, sample), fields(rows = sample.len()))]
pub async fn analyze_file_structure(
    provider: &dyn CompletionProvider,
    sample: &[serde_json::Value],
    file_name: &str,
) -> Result<FileStructure, AiError> {
    let prompt = build_prompt(sample, file_name)?;
    let answer = provider.complete(SYSTEM, &prompt).await?;
    let structure: FileStructure = parse_model_json(&answer)?;

    info!(
        header_row = structure.header_row_index,
        "Detected structure of {}", file_name
    );
    Ok(structure)
}
