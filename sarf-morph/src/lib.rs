//! Root-and-pattern morphology for triliteral Arabic verbs.
//!
//! Everything here is pure: no I/O beyond the explicit `from_file` loaders,
//! no logging, no shared state.

pub mod classifier;
pub mod expander;
pub mod metadata;
pub mod normalizer;
pub mod pattern;
pub mod pipeline;
pub mod rules;
pub mod slot;
pub mod transform;

pub use classifier::{classify, is_hamza, is_weak, Glide, VerbCategory};
pub use expander::expand;
pub use metadata::{CategoryCatalog, CategoryInfo, Difficulty};
pub use normalizer::{normalize, strip_diacritics, AlefPolicy, ArabicNormalizer};
pub use pattern::apply_pattern;
pub use pipeline::{derive, Derivation};
pub use rules::{RuleDiagnostic, RuleError, RuleOp, RuleTable, DEFAULT_RULES};
pub use slot::{detect_slot, Slot};
pub use transform::{transform, transform_slot};

#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    #[error("unknown category key `{0}`")]
    UnknownCategoryKey(String),

    #[error("invalid category metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
