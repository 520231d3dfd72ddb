use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::categorize::MaterialDescriptor;
use super::{CompletionProvider, parse_model_json};

const SYSTEM: &str = "You are a building site expert. You review material lists and suggest \
                      the essential items that are missing. Answer ONLY with valid JSON.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

/// A material the project probably needs but does not list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionStats {
    pub from_rules: usize,
    pub from_model: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionResult {
    pub suggestions: Vec<Suggestion>,
    pub analysis: String,
    pub stats: SuggestionStats,
}

#[derive(Debug, Deserialize)]
struct ModelAnswer {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
    #[serde(default)]
    analysis: String,
}

/// When a project lists one of `requires`, it likely also needs `suggestions`
struct ComplementaryRule {
    requires: &'static [&'static str],
    category: &'static str,
    suggestions: &'static [(&'static str, &'static str, Priority)],
}

const COMPLEMENTARY_RULES: [ComplementaryRule; 6] = [
    ComplementaryRule {
        requires: &["carrelage", "faïence", "grès", "cérame"],
        category: "Carrelage et Revêtements",
        suggestions: &[
            ("Colle carrelage C2", "Needed to lay the tiles", Priority::High),
            ("Joint carrelage", "Needed to fill the joints between tiles", Priority::High),
            ("Croisillons 2mm", "Keeps tile spacing even", Priority::Medium),
            ("Profilé de finition alu", "Finishes corners and stair nosings", Priority::Low),
        ],
    },
    ComplementaryRule {
        requires: &["peinture", "acrylique", "glycéro"],
        category: "Peinture et Décoration",
        suggestions: &[
            ("Sous-couche universelle", "Improves adhesion and finish", Priority::High),
            ("Bâche de protection", "Protects floors during the work", Priority::Medium),
            ("Ruban de masquage", "Gives clean lines at junctions", Priority::Medium),
            ("White spirit", "Cleans tools after solvent paint", Priority::Low),
        ],
    },
    ComplementaryRule {
        requires: &["placo", "ba13", "placoplatre", "plâtre"],
        category: "Plâtrerie et Isolation",
        suggestions: &[
            ("Bande à joint papier", "Treats joints between boards", Priority::High),
            ("Enduit à joint", "Smooths the board joints", Priority::High),
            ("Vis placo 25mm", "Fixes boards to the frame", Priority::High),
            ("Rails et montants", "Metal frame for partitions", Priority::Medium),
        ],
    },
    ComplementaryRule {
        requires: &["câble", "fil", "électrique", "disjoncteur", "tableau"],
        category: "Électricité",
        suggestions: &[
            ("Gaines ICTA 20mm", "Mandatory protection for electrical cables", Priority::High),
            ("Boîtes d'encastrement", "Houses sockets and switches", Priority::High),
            ("Dominos/Wago", "Safe connections between wires", Priority::Medium),
            ("Attaches câbles", "Keeps cable runs tidy", Priority::Low),
        ],
    },
    ComplementaryRule {
        requires: &["tuyau", "pvc", "cuivre", "per", "raccord"],
        category: "Plomberie",
        suggestions: &[
            ("Téflon/Filasse", "Seals threaded fittings", Priority::High),
            ("Colliers de fixation", "Holds pipes in place", Priority::Medium),
            ("Colle PVC", "Joins PVC pipes", Priority::Medium),
        ],
    },
    ComplementaryRule {
        requires: &["bois", "porte", "fenêtre", "parquet", "lambris"],
        category: "Menuiserie",
        suggestions: &[
            ("Vis à bois assortiment", "Fixes wooden parts", Priority::High),
            ("Colle à bois", "Wood joints and gluing", Priority::Medium),
            ("Papier de verre multi-grains", "Sanding and finishing wood", Priority::Medium),
        ],
    },
];

/// Whether two names overlap, one containing the other
fn overlaps(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Suggestions implied by the complementary rules
pub fn rule_suggestions(materials: &[MaterialDescriptor]) -> Vec<Suggestion> {
    let existing: Vec<String> = materials.iter().map(|m| m.name.to_lowercase()).collect();
    let mut suggestions: Vec<Suggestion> = Vec::new();

    for rule in &COMPLEMENTARY_RULES {
        let triggered = existing
            .iter()
            .any(|name| rule.requires.iter().any(|k| name.contains(k)));
        if !triggered {
            continue;
        }
        for (name, reason, priority) in rule.suggestions {
            let already_listed = existing.iter().any(|e| overlaps(e, name));
            let already_suggested = suggestions.iter().any(|s| s.name == *name);
            if !already_listed && !already_suggested {
                suggestions.push(Suggestion {
                    name: name.to_string(),
                    category: Some(rule.category.to_string()),
                    reason: reason.to_string(),
                    priority: *priority,
                });
            }
        }
    }
    suggestions
}

fn build_prompt(
    materials: &[MaterialDescriptor],
    project_type: Option<&str>,
    project_name: Option<&str>,
    already_suggested: &[Suggestion],
) -> String {
    let mut by_category: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for material in materials {
        let category = material
            .category
            .clone()
            .unwrap_or_else(|| "Uncategorized".to_string());
        by_category.entry(category).or_default().push(&material.name);
    }
    let summary = by_category
        .iter()
        .map(|(category, items)| {
            let shown = items.iter().take(8).copied().collect::<Vec<_>>().join(", ");
            if items.len() > 8 {
                format!("{} ({}): {} (+{})", category, items.len(), shown, items.len() - 8)
            } else {
                format!("{} ({}): {}", category, items.len(), shown)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let suggested = if already_suggested.is_empty() {
        "none".to_string()
    } else {
        already_suggested
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"PROJECT
- Type: {project_type}
- Name: {project_name}
- Number of materials: {count}

MATERIALS ALREADY LISTED:
{summary}

ALREADY SUGGESTED (do not repeat): {suggested}

List 10 to 15 ESSENTIAL materials this site is probably missing. Consider
structural work, electricity, plumbing, finishes, fixings, safety equipment
and consumables.

Priority: "high" when work cannot proceed without it, "medium" when it is
needed for quality work, "low" when it only makes the work easier.

Answer with JSON:
{{"suggestions": [{{"name": "...", "category": "...", "reason": "...", "priority": "high|medium|low"}}], "analysis": "one sentence"}}"#,
        project_type = project_type.unwrap_or("Construction/Renovation"),
        project_name = project_name.unwrap_or("Building project"),
        count = materials.len(),
    )
}

/// Suggests materials a project is likely missing
///
/// Rule suggestions come first, then model suggestions that do not overlap
/// an existing material or a rule suggestion. The result is ordered by
/// priority. A failed model call leaves only the rule suggestions.
#[instrument(skip(provider, materials), fields(count = materials.len()))]
pub async fn suggest_materials(
    provider: &dyn CompletionProvider,
    materials: &[MaterialDescriptor],
    project_type: Option<&str>,
    project_name: Option<&str>,
) -> SuggestionResult {
    let rules = rule_suggestions(materials);
    info!("Rule-based suggestions: {}", rules.len());

    let prompt = build_prompt(materials, project_type, project_name, &rules);
    let answer = match provider.complete(SYSTEM, &prompt).await {
        Ok(text) => parse_model_json::<ModelAnswer>(&text),
        Err(e) => Err(e),
    };
    let (model_suggestions, analysis) = match answer {
        Ok(answer) => (answer.suggestions, answer.analysis),
        Err(e) => {
            warn!("Model suggestions unavailable: {}", e);
            (Vec::new(), String::new())
        }
    };

    let mut from_model: Vec<Suggestion> = Vec::new();
    for suggestion in model_suggestions {
        if suggestion.name.trim().is_empty() {
            continue;
        }
        let listed = materials.iter().any(|m| overlaps(&m.name, &suggestion.name));
        let suggested = rules
            .iter()
            .chain(from_model.iter())
            .any(|s| overlaps(&s.name, &suggestion.name));
        if !listed && !suggested {
            from_model.push(suggestion);
        }
    }

    let stats = SuggestionStats {
        from_rules: rules.len(),
        from_model: from_model.len(),
        total: rules.len() + from_model.len(),
    };
    let mut suggestions = rules;
    suggestions.extend(from_model);
    // Stable, so rule suggestions stay ahead within a priority
    suggestions.sort_by_key(|s| s.priority);

    SuggestionResult {
        suggestions,
        analysis,
        stats,
    }
}
