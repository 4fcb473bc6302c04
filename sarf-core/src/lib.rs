use rayon::prelude::*;
use serde::Serialize;

use sarf_index::{DerivedWord, RootEntry, RootTree, Scheme, SchemeTable, TreeShape};
use sarf_morph::pattern::radical_positions;
use sarf_morph::{
    derive, normalize, strip_diacritics, CategoryCatalog, CategoryInfo, Derivation, RuleTable,
    Slot, VerbCategory,
};

pub use sarf_index;
pub use sarf_morph;

/// Roots present in a freshly seeded context.
pub const DEFAULT_ROOTS: [&str; 4] = ["كتب", "رسم", "درس", "خرج"];

/// Schemes present in a freshly seeded context.
pub fn default_schemes() -> Vec<Scheme> {
    vec![
        Scheme::new("فعل", "فَعَلَ", "Base"),
        Scheme::new("يفعل", "يَفْعَلُ", "Present"),
        Scheme::new("أمر", "اِفْعَلْ", "Imperative"),
        Scheme::new("فاعل", "فَاعِل", "Agent"),
        Scheme::new("مفعول", "مَفْعُول", "Patient"),
    ]
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("root `{0}` must be exactly 3 letters")]
    InvalidRoot(String),

    #[error("invalid scheme: {0}")]
    InvalidScheme(String),

    #[error("root `{0}` not found")]
    RootMissing(String),

    #[error("scheme `{0}` not found")]
    SchemeMissing(String),
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    pub root: String,
    pub scheme_id: String,
    pub word: String,
    pub category: VerbCategory,
    pub slot: Slot,
    pub frequency: u64,
}

/// Outcome of checking a candidate word against every registered scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_scheme_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
}

impl Validation {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            matched_scheme_id: None,
            generated: None,
        }
    }
}

/// Strip harakat and surrounding whitespace, then require three letters.
/// Hamza seats are kept: the classifier depends on them.
pub fn canonical_root(root: &str) -> Result<String, CoreError> {
    let canonical = strip_diacritics(root).trim().to_string();
    if canonical.chars().count() != 3 || canonical.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidRoot(root.to_string()));
    }
    Ok(canonical)
}

/// The root repository, the scheme registry and the tables the pipeline
/// reads, held together so independent instances never share state.
#[derive(Debug, Clone)]
pub struct MorphologyContext {
    roots: RootTree,
    schemes: SchemeTable,
    rules: RuleTable,
    catalog: CategoryCatalog,
}

impl Default for MorphologyContext {
    fn default() -> Self {
        Self::new(RuleTable::builtin(), CategoryCatalog::builtin())
    }
}

impl MorphologyContext {
    /// Empty stores over the given tables.
    pub fn new(rules: RuleTable, catalog: CategoryCatalog) -> Self {
        Self {
            roots: RootTree::new(),
            schemes: SchemeTable::new(),
            rules,
            catalog,
        }
    }

    /// Built-in tables plus the default roots and schemes.
    pub fn with_defaults() -> Self {
        let mut ctx = Self::default();
        ctx.seed_defaults();
        ctx
    }

    pub fn seed_defaults(&mut self) {
        for root in DEFAULT_ROOTS {
            self.roots.insert(root);
        }
        for scheme in default_schemes() {
            self.schemes.put(scheme);
        }
    }

    pub fn classify(&self, root: &str) -> VerbCategory {
        sarf_morph::classify(root)
    }

    pub fn add_root(&mut self, root: &str) -> Result<&RootEntry, CoreError> {
        let root = canonical_root(root)?;
        self.roots.insert(&root);
        self.roots
            .search(&root)
            .ok_or(CoreError::RootMissing(root))
    }

    /// Register or replace a scheme. Returns the scheme it replaced.
    pub fn add_scheme(&mut self, scheme: Scheme) -> Result<Option<Scheme>, CoreError> {
        if scheme.id.trim().is_empty() {
            return Err(CoreError::InvalidScheme("identifier is empty".into()));
        }
        if radical_positions(&scheme.pattern).iter().any(Option::is_none) {
            return Err(CoreError::InvalidScheme(format!(
                "pattern `{}` must contain ف, ع and ل",
                scheme.pattern
            )));
        }
        Ok(self.schemes.put(scheme))
    }

    /// Run the pipeline without touching the repository.
    pub fn preview(&self, root: &str, scheme_id: &str) -> Result<Derivation, CoreError> {
        self.derive_canonical(&canonical_root(root)?, scheme_id)
    }

    /// Derive the word and record it on the root.
    pub fn generate(&mut self, root: &str, scheme_id: &str) -> Result<Generated, CoreError> {
        let root = canonical_root(root)?;
        let derivation = self.derive_canonical(&root, scheme_id)?;
        let frequency = self.record_word(&root, &derivation.word, Some(scheme_id))?;
        Ok(Generated {
            root,
            scheme_id: scheme_id.to_string(),
            word: derivation.word,
            category: derivation.category,
            slot: derivation.slot,
            frequency,
        })
    }

    /// Find the first scheme, in registry order, whose output matches `word`
    /// under normalization. On a match the candidate is recorded as given
    /// (trimmed), so a diacritized spelling gets its own entry.
    pub fn validate(&mut self, word: &str, root: &str) -> Result<Validation, CoreError> {
        let root = canonical_root(root)?;
        let entry = self
            .roots
            .search(&root)
            .ok_or_else(|| CoreError::RootMissing(root.clone()))?;

        let target = normalize(word);
        if target.is_empty() {
            return Ok(Validation::invalid());
        }

        let schemes = self.schemes.all();
        let found = schemes.par_iter().find_map_first(|scheme| {
            let derivation = self.derive_for(entry, scheme);
            (normalize(&derivation.word) == target).then(|| (scheme.id.clone(), derivation.word))
        });

        let Some((scheme_id, generated)) = found else {
            return Ok(Validation::invalid());
        };
        self.record_word(&root, word.trim(), Some(&scheme_id))?;
        Ok(Validation {
            is_valid: true,
            matched_scheme_id: Some(scheme_id),
            generated: Some(generated),
        })
    }

    fn derive_canonical(&self, root: &str, scheme_id: &str) -> Result<Derivation, CoreError> {
        let entry = self
            .roots
            .search(root)
            .ok_or_else(|| CoreError::RootMissing(root.to_string()))?;
        let scheme = self
            .schemes
            .get(scheme_id)
            .ok_or_else(|| CoreError::SchemeMissing(scheme_id.to_string()))?;
        Ok(self.derive_for(entry, scheme))
    }

    fn derive_for(&self, entry: &RootEntry, scheme: &Scheme) -> Derivation {
        derive(
            &entry.root,
            entry.category,
            &scheme.id,
            &scheme.pattern,
            &self.rules,
        )
    }

    /// Bump (or append) a derived word on an existing root.
    pub fn record_word(
        &mut self,
        root: &str,
        word: &str,
        scheme_id: Option<&str>,
    ) -> Result<u64, CoreError> {
        let entry = self
            .roots
            .search_mut(root)
            .ok_or_else(|| CoreError::RootMissing(root.to_string()))?;
        Ok(entry.record_word(word, scheme_id))
    }

    /// Re-insert a persisted root with its derived words. The category is
    /// recomputed, never read back.
    pub fn restore_root(
        &mut self,
        root: &str,
        derived_words: Vec<DerivedWord>,
    ) -> Result<(), CoreError> {
        let root = canonical_root(root)?;
        self.roots.insert(&root);
        if let Some(entry) = self.roots.search_mut(&root) {
            entry.derived_words = derived_words;
        }
        Ok(())
    }

    pub fn lookup_root(&self, root: &str) -> Option<&RootEntry> {
        let root = canonical_root(root).ok()?;
        self.roots.search(&root)
    }

    pub fn roots(&self) -> Vec<&RootEntry> {
        self.roots.in_order()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn visualize(&self) -> Option<TreeShape> {
        self.roots.visualize()
    }

    pub fn scheme(&self, id: &str) -> Option<&Scheme> {
        self.schemes.get(id)
    }

    pub fn schemes(&self) -> Vec<&Scheme> {
        self.schemes.all()
    }

    pub fn category_info(&self, category: VerbCategory) -> Option<&CategoryInfo> {
        self.catalog.get(category)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: RuleTable) {
        self.rules = rules;
    }

    pub fn set_catalog(&mut self, catalog: CategoryCatalog) {
        self.catalog = catalog;
    }
}
