use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{CompletionProvider, parse_model_json};

/// Trade categories of the building industry materials are filed under
pub const BTP_CATEGORIES: [&str; 17] = [
    "Gros œuvre",
    "Électricité",
    "Plomberie",
    "Menuiserie",
    "Peinture et Décoration",
    "Carrelage et Revêtements",
    "Quincaillerie",
    "Sanitaire",
    "Éclairage",
    "Serrurerie",
    "Plâtrerie et Isolation",
    "Chauffage et Climatisation",
    "Outillage",
    "Sécurité et Protection",
    "Toiture et Couverture",
    "Jardin et Extérieurs",
    "Divers",
];

/// Category for anything that fits nowhere else
pub const FALLBACK_CATEGORY: &str = "Divers";

const SYSTEM: &str = "You are a building materials expert. You file construction materials \
                      into trade categories. Answer ONLY with valid JSON.";

/// Keyword rules checked in order; the first match wins
const KEYWORD_RULES: [(&[&str], &str); 11] = [
    (
        &["ciment", "béton", "brique", "parpaing", "sable", "fer à béton"],
        "Gros œuvre",
    ),
    (
        &["câble", "fil", "disjoncteur", "interrupteur", "prise", "tableau électrique"],
        "Électricité",
    ),
    (&["tuyau", "raccord", "vanne", "robinet", "siphon"], "Plomberie"),
    (&["porte", "fenêtre", "bois", "planche", "tasseau"], "Menuiserie"),
    (
        &["peinture", "vernis", "enduit", "pinceau", "rouleau"],
        "Peinture et Décoration",
    ),
    (
        &["carrelage", "faience", "sol", "colle carrelage"],
        "Carrelage et Revêtements",
    ),
    (&["vis", "clou", "boulon", "cheville", "écrou"], "Quincaillerie"),
    (&["wc", "lavabo", "douche", "baignoire", "évier"], "Sanitaire"),
    (&["lampe", "spot", "ampoule", "led", "projecteur"], "Éclairage"),
    (&["serrure", "poignée", "cylindre", "verrou"], "Serrurerie"),
    (
        &["placo", "plâtre", "ba13", "rail", "montant", "isolation", "laine"],
        "Plâtrerie et Isolation",
    ),
];

/// A material to categorize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationStats {
    pub total: usize,
    pub by_keywords: usize,
    pub by_model: usize,
}

/// Category per material index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationResult {
    pub category_map: BTreeMap<usize, String>,
    pub categories: Vec<String>,
    pub stats: CategorizationStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelCategorization {
    original_index: usize,
    category: String,
}

#[derive(Debug, Deserialize)]
struct ModelAnswer {
    #[serde(default)]
    categorizations: Vec<ModelCategorization>,
}

/// The category implied by keywords in a material name, if any
pub fn keyword_category(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, category)| *category)
}

fn build_prompt(
    materials: &[MaterialDescriptor],
    indices: &[usize],
    project_type: Option<&str>,
) -> String {
    let listing = indices
        .iter()
        .enumerate()
        .map(|(i, idx)| {
            let material = &materials[*idx];
            match &material.description {
                Some(desc) if !desc.is_empty() => {
                    format!("{}. [IDX:{}] {} - {}", i + 1, idx, material.name, desc)
                }
                _ => format!("{}. [IDX:{}] {}", i + 1, idx, material.name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let categories = BTP_CATEGORIES
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"File EVERY material below under the most appropriate category.

CATEGORIES (use these exact names):
{categories}

PROJECT TYPE: {project_type}

MATERIALS:
{listing}

Every material must get a category. Use "Divers" only when nothing fits.
originalIndex is the number shown in [IDX:X].

Answer with JSON:
{{"categorizations": [{{"originalIndex": 0, "category": "Category"}}]}}"#,
        project_type = project_type.unwrap_or("General construction"),
    )
}

/// Files every material under one of [`BTP_CATEGORIES`]
///
/// Keyword rules run first; only the remaining materials are sent to the
/// model. Model answers outside the category list become `Divers`, and a
/// failed model call leaves the remaining materials in `Divers`.
#[instrument(skip(provider, materials), fields(count = materials.len()))]
pub async fn categorize_materials(
    provider: &dyn CompletionProvider,
    materials: &[MaterialDescriptor],
    project_type: Option<&str>,
) -> CategorizationResult {
    let mut category_map = BTreeMap::new();
    let mut uncategorized = Vec::new();

    for (index, material) in materials.iter().enumerate() {
        match keyword_category(&material.name) {
            Some(category) => {
                category_map.insert(index, category.to_string());
            }
            None => uncategorized.push(index),
        }
    }

    info!(
        "Pre-categorized {} materials by keywords, {} left for the model",
        category_map.len(),
        uncategorized.len()
    );

    if !uncategorized.is_empty() {
        let prompt = build_prompt(materials, &uncategorized, project_type);
        let answer = match provider.complete(SYSTEM, &prompt).await {
            Ok(text) => parse_model_json::<ModelAnswer>(&text),
            Err(e) => Err(e),
        };
        match answer {
            Ok(answer) => {
                for item in answer.categorizations {
                    if item.original_index >= materials.len() {
                        continue;
                    }
                    let category = if BTP_CATEGORIES.contains(&item.category.as_str()) {
                        item.category
                    } else {
                        FALLBACK_CATEGORY.to_string()
                    };
                    category_map.insert(item.original_index, category);
                }
            }
            Err(e) => warn!("Model categorization failed: {}", e),
        }
    }

    for index in 0..materials.len() {
        category_map
            .entry(index)
            .or_insert_with(|| FALLBACK_CATEGORY.to_string());
    }

    CategorizationResult {
        category_map,
        categories: BTP_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        stats: CategorizationStats {
            total: materials.len(),
            by_keywords: materials.len() - uncategorized.len(),
            by_model: uncategorized.len(),
        },
    }
}
