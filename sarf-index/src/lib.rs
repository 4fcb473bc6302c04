//! In-memory stores for roots and schemes.

use serde::{Deserialize, Serialize};

use sarf_morph::VerbCategory;

pub mod avl;
pub mod registry;

pub use avl::RootTree;
pub use registry::{scheme_hash, SchemeTable, BUCKET_COUNT};

/// A word produced from a root, with how many times it was generated or
/// validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedWord {
    pub word: String,
    pub frequency: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_id: Option<String>,
}

/// One node payload of the root tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootEntry {
    pub root: String,
    pub category: VerbCategory,
    pub derived_words: Vec<DerivedWord>,
}

impl RootEntry {
    pub fn new(root: impl Into<String>, category: VerbCategory) -> Self {
        Self {
            root: root.into(),
            category,
            derived_words: Vec::new(),
        }
    }

    /// Bump the frequency of `word`, or append it with frequency 1. Returns
    /// the new frequency.
    pub fn record_word(&mut self, word: &str, scheme_id: Option<&str>) -> u64 {
        if let Some(existing) = self.derived_words.iter_mut().find(|d| d.word == word) {
            existing.frequency += 1;
            if existing.scheme_id.is_none() {
                existing.scheme_id = scheme_id.map(str::to_string);
            }
            return existing.frequency;
        }
        self.derived_words.push(DerivedWord {
            word: word.to_string(),
            frequency: 1,
            scheme_id: scheme_id.map(str::to_string),
        });
        1
    }

    pub fn frequency_of(&self, word: &str) -> Option<u64> {
        self.derived_words
            .iter()
            .find(|d| d.word == word)
            .map(|d| d.frequency)
    }
}

/// A morphological scheme: identifier, template and a free-form label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: String,
    pub pattern: String,
    pub transformation_rule: String,
}

impl Scheme {
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        transformation_rule: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            transformation_rule: transformation_rule.into(),
        }
    }
}

/// Structural dump of the root tree for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeShape {
    pub name: String,
    pub balance: i32,
    pub children: Vec<TreeShape>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_word_increments_instead_of_duplicating() {
        let mut entry = RootEntry::new("كتب", VerbCategory::Regular);
        assert_eq!(entry.record_word("كاتب", Some("فاعل")), 1);
        assert_eq!(entry.record_word("كاتب", Some("فاعل")), 2);
        assert_eq!(entry.derived_words.len(), 1);
        assert_eq!(entry.frequency_of("كاتب"), Some(2));
        assert_eq!(entry.frequency_of("مكتوب"), None);
    }

    #[test]
    fn record_word_matches_the_exact_spelling() {
        let mut entry = RootEntry::new("أكل", VerbCategory::HamzatedInitial);
        entry.record_word("آكل", None);
        entry.record_word("اكل", None);
        assert_eq!(entry.derived_words.len(), 2);
    }

    #[test]
    fn scheme_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(Scheme::new("فعل", "فَعَلَ", "Base")).unwrap();
        assert_eq!(json["transformationRule"], "Base");
        let back: Scheme = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, "فعل");
    }

    #[test]
    fn derived_word_omits_missing_scheme() {
        let json = serde_json::to_value(DerivedWord {
            word: "كاتب".into(),
            frequency: 1,
            scheme_id: None,
        })
        .unwrap();
        assert!(json.get("schemeId").is_none());
        let back: DerivedWord = serde_json::from_str(r#"{"word":"كاتب","frequency":3}"#).unwrap();
        assert_eq!(back.frequency, 3);
    }
}
