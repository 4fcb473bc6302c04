//! Descriptive metadata per category.
//!
//! Read-only enrichment for lookups (example root, difficulty, what makes the
//! category special). Nothing in derivation or validation consults it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::VerbCategory;
use crate::MorphError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub example_root: String,
    pub difficulty: Difficulty,
    pub description: String,
}

static BUILTIN_CATEGORIES: &[(&str, &str, Difficulty, &str)] = &[
    ("regular", "كتب", Difficulty::Easy, "No weak letter, no hamza, no doubling; patterns apply as is."),
    ("doubled", "مدد", Difficulty::Medium, "Second and third radicals are identical and may merge."),
    ("hamzated_initial", "أكل", Difficulty::Medium, "Hamza in first position; merges with a following alef into madda."),
    ("hamzated_medial", "سأل", Difficulty::Medium, "Hamza in second position; its seat follows the surrounding vowels."),
    ("hamzated_final", "قرأ", Difficulty::Medium, "Hamza in third position; sits on yaa after kasra."),
    ("weak_initial_waw", "وجد", Difficulty::Medium, "Initial waw drops in the present and imperative."),
    ("weak_initial_yaa", "يبس", Difficulty::Medium, "Initial yaa, treated like the waw-initial roots."),
    ("weak_initial_alef", "اخذ", Difficulty::Easy, "Initial bare alef, usually an unmarked hamza."),
    ("weak_medial_waw", "قال", Difficulty::Hard, "Hollow root; medial waw surfaces as alef in the past."),
    ("weak_medial_yaa", "باع", Difficulty::Hard, "Hollow root; medial yaa surfaces as alef in the past."),
    ("weak_final_yaa", "بقي", Difficulty::Hard, "Final yaa; drops in the imperative and agent noun."),
    ("weak_final_waw", "سمو", Difficulty::Hard, "Final waw; drops in the imperative and agent noun."),
    ("weak_final_alef", "دعا", Difficulty::Hard, "Final alef of waw origin; returns as waw in the present."),
    ("doubly_weak_split", "وقى", Difficulty::Hard, "Weak first and third radicals; the imperative keeps only the middle one."),
    ("doubly_weak_joined_waw", "يوم", Difficulty::Hard, "Adjacent weak radicals, the last of them waw."),
    ("doubly_weak_joined_yaa", "طوى", Difficulty::Hard, "Adjacent weak radicals, final yaa."),
];

#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    entries: HashMap<String, CategoryInfo>,
}

impl CategoryCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN_CATEGORIES
            .iter()
            .map(|(key, example, difficulty, description)| {
                (
                    key.to_string(),
                    CategoryInfo {
                        example_root: example.to_string(),
                        difficulty: *difficulty,
                        description: description.to_string(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Parse a JSON object keyed by category key, or by a coarse prefix
    /// covering every flavor (`weak_final`).
    pub fn from_json(source: &str) -> Result<Self, MorphError> {
        let entries: HashMap<String, CategoryInfo> = serde_json::from_str(source)?;
        for key in entries.keys() {
            let is_prefix = VerbCategory::ALL.iter().any(|c| c.prefix() == key.as_str());
            if !is_prefix {
                key.parse::<VerbCategory>()?;
            }
        }
        Ok(Self { entries })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MorphError> {
        let source = fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Metadata for the exact flavor, falling back to the coarse bucket.
    pub fn get(&self, category: VerbCategory) -> Option<&CategoryInfo> {
        self.entries
            .get(&category.key())
            .or_else(|| self.entries.get(category.prefix()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
