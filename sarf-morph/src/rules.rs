//! Irregular Rule Table
//!
//! Hand-authored overrides applied after the transformation engine. The
//! source is line oriented:
//!
//! ```text
//! # comment
//! exception_رأى_يفعل: replace=أ>
//! weak_final_فاعل: replace_final=
//! ```
//!
//! Bad lines and bad operations are skipped and reported through
//! [`RuleTable::diagnostics`]; they never stop the rest of the table from
//! loading.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::VerbCategory;
use crate::slot::Slot;

/// Rules shipped with the crate, used when no external table is supplied.
pub static DEFAULT_RULES: &str = include_str!("../data/irregular_rules.txt");

const EXCEPTION_PREFIX: &str = "exception";

/// One edit of an irregular rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RuleOp {
    /// Replace every occurrence of `from` with `to` (empty `to` deletes).
    Replace { from: String, to: String },
    /// Replace the last character with `with`.
    ReplaceFinal { with: String },
}

impl RuleOp {
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        if let Some(with) = text.strip_prefix("replace_final=") {
            return Ok(RuleOp::ReplaceFinal {
                with: with.to_string(),
            });
        }
        if let Some(body) = text.strip_prefix("replace=") {
            let (from, to) = body
                .split_once('>')
                .ok_or_else(|| RuleError::MissingArrow(text.to_string()))?;
            if from.is_empty() {
                return Err(RuleError::EmptyPattern(text.to_string()));
            }
            return Ok(RuleOp::Replace {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Err(RuleError::UnknownOperation(text.to_string()))
    }

    pub fn apply(&self, word: &str) -> String {
        match self {
            RuleOp::Replace { from, to } => word.replace(from.as_str(), to),
            RuleOp::ReplaceFinal { with } => {
                let mut chars = word.chars();
                if chars.next_back().is_none() {
                    return String::new();
                }
                let mut result: String = chars.collect();
                result.push_str(with);
                result
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("line has no `key:` separator")]
    MissingSeparator,

    #[error("rule key is empty")]
    EmptyKey,

    #[error("replace operation `{0}` is missing `>`")]
    MissingArrow(String),

    #[error("replace operation `{0}` has an empty search string")]
    EmptyPattern(String),

    #[error("unrecognized operation `{0}`")]
    UnknownOperation(String),

    #[error("rule `{0}` has no usable operations")]
    NoOperations(String),

    #[error("rule `{0}` defined again; the later definition wins")]
    DuplicateKey(String),
}

/// A rejected line or operation, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDiagnostic {
    pub line: usize,
    pub text: String,
    pub error: RuleError,
}

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Vec<RuleOp>>,
    diagnostics: Vec<RuleDiagnostic>,
}

impl RuleTable {
    /// A table with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Self {
        Self::parse(DEFAULT_RULES)
    }

    /// Load a rule file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parse rule source, collecting diagnostics instead of failing.
    pub fn parse(contents: &str) -> Self {
        let mut table = Self::default();

        for (idx, raw_line) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, body)) = line.split_once(':') else {
                table.reject(line_no, line, RuleError::MissingSeparator);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                table.reject(line_no, line, RuleError::EmptyKey);
                continue;
            }

            let mut ops = Vec::new();
            for op_text in body.split(';').map(str::trim).filter(|op| !op.is_empty()) {
                match RuleOp::parse(op_text) {
                    Ok(op) => ops.push(op),
                    Err(error) => table.reject(line_no, op_text, error),
                }
            }

            if ops.is_empty() {
                table.reject(line_no, line, RuleError::NoOperations(key.to_string()));
                continue;
            }
            if table.rules.insert(key.to_string(), ops).is_some() {
                table.reject(line_no, line, RuleError::DuplicateKey(key.to_string()));
            }
        }

        table
    }

    fn reject(&mut self, line: usize, text: &str, error: RuleError) {
        self.diagnostics.push(RuleDiagnostic {
            line,
            text: text.to_string(),
            error,
        });
    }

    pub fn diagnostics(&self) -> &[RuleDiagnostic] {
        &self.diagnostics
    }

    pub fn get(&self, key: &str) -> Option<&[RuleOp]> {
        self.rules.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn exception_key(root: &str, scheme_id: &str) -> String {
        format!("{EXCEPTION_PREFIX}_{root}_{scheme_id}")
    }

    pub fn category_key(category: VerbCategory, scheme_id: &str) -> String {
        format!("{}_{}", category.prefix(), scheme_id)
    }

    /// Find the operations that apply: the root's own exception first, then
    /// the category-wide rule.
    pub fn lookup(&self, root: &str, category: VerbCategory, scheme_id: &str) -> Option<&[RuleOp]> {
        self.get(&Self::exception_key(root, scheme_id))
            .or_else(|| self.get(&Self::category_key(category, scheme_id)))
    }

    /// Apply the matching override, if any, to an engine-produced word.
    pub fn apply(
        &self,
        word: &str,
        root: &str,
        category: VerbCategory,
        slot: Slot,
        scheme_id: &str,
    ) -> String {
        let exempt = matches!(
            (category, slot),
            (VerbCategory::Unknown, _) | (VerbCategory::DoublyWeakSplit, Slot::AgentNoun)
        );
        if exempt {
            return word.to_string();
        }

        match self.lookup(root, category, scheme_id) {
            Some(ops) => ops
                .iter()
                .fold(word.to_string(), |current, op| op.apply(&current)),
            None => word.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Glide;

    #[test]
    fn parses_both_operation_kinds() {
        let table = RuleTable::parse("exception_دعا_فاعل: replace=ا>ي; replace_final=ٍ\n");
        assert!(table.diagnostics().is_empty());
        assert_eq!(
            table.get("exception_دعا_فاعل").unwrap(),
            &[
                RuleOp::Replace {
                    from: "ا".into(),
                    to: "ي".into()
                },
                RuleOp::ReplaceFinal { with: "ٍ".into() },
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let table = RuleTable::parse("# header\n\n   \n# weak_final_فاعل: replace_final=\n");
        assert!(table.is_empty());
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn drops_bad_operations_but_keeps_the_line() {
        let table = RuleTable::parse("weak_final_فاعل: replace=>x; frobnicate; replace_final=\n");
        assert_eq!(
            table.get("weak_final_فاعل").unwrap(),
            &[RuleOp::ReplaceFinal {
                with: String::new()
            }]
        );
        let errors: Vec<_> = table.diagnostics().iter().map(|d| d.error.clone()).collect();
        assert_eq!(
            errors,
            vec![
                RuleError::EmptyPattern("replace=>x".into()),
                RuleError::UnknownOperation("frobnicate".into()),
            ]
        );
        assert!(table.diagnostics().iter().all(|d| d.line == 1));
    }

    #[test]
    fn reports_malformed_lines_and_keeps_loading() {
        let source = "no separator here\n: replace=a>b\nbroken: replace=ab\ngood_key: replace=a>b\n";
        let table = RuleTable::parse(source);
        assert_eq!(table.len(), 1);
        assert!(table.get("good_key").is_some());
        let lines: Vec<usize> = table.diagnostics().iter().map(|d| d.line).collect();
        // line 3 reports both the bad op and the now-empty rule
        assert_eq!(lines, vec![1, 2, 3, 3]);
        assert_eq!(table.diagnostics()[0].error, RuleError::MissingSeparator);
        assert_eq!(table.diagnostics()[1].error, RuleError::EmptyKey);
    }

    #[test]
    fn later_duplicate_wins() {
        let table = RuleTable::parse("k: replace=a>b\nk: replace=a>c\n");
        assert_eq!(table.apply_raw("k", "a"), "c");
        assert_eq!(
            table.diagnostics()[0].error,
            RuleError::DuplicateKey("k".into())
        );
    }

    #[test]
    fn replace_final_handles_empty_words() {
        let op = RuleOp::ReplaceFinal { with: "x".into() };
        assert_eq!(op.apply(""), "");
        assert_eq!(op.apply("داعا"), "داعx");
    }

    #[test]
    fn exception_shadows_category_rule() {
        let table = RuleTable::parse(
            "weak_final_فاعل: replace_final=\nexception_دعا_فاعل: replace=داعا>داعي\n",
        );
        let category = VerbCategory::WeakFinal(Glide::Alef);
        assert_eq!(
            table.apply("داعا", "دعا", category, Slot::AgentNoun, "فاعل"),
            "داعي"
        );
        assert_eq!(
            table.apply("ساما", "سما", category, Slot::AgentNoun, "فاعل"),
            "سام"
        );
    }

    #[test]
    fn category_prefix_covers_every_flavor() {
        let table = RuleTable::parse("weak_final_فاعل: replace_final=\n");
        for glide in [Glide::Waw, Glide::Yaa, Glide::Alef] {
            let out = table.apply(
                "باقي",
                "بقي",
                VerbCategory::WeakFinal(glide),
                Slot::AgentNoun,
                "فاعل",
            );
            assert_eq!(out, "باق");
        }
    }

    #[test]
    fn split_agent_noun_and_unknown_are_never_overridden() {
        let table = RuleTable::parse(
            "doubly_weak_split_فاعل: replace_final=x\nexception_وقى_فاعل: replace_final=x\nunknown_فاعل: replace_final=x\n",
        );
        assert_eq!(
            table.apply("واق", "وقى", VerbCategory::DoublyWeakSplit, Slot::AgentNoun, "فاعل"),
            "واق"
        );
        assert_eq!(
            table.apply("abc", "ab", VerbCategory::Unknown, Slot::AgentNoun, "فاعل"),
            "abc"
        );
    }

    #[test]
    fn builtin_table_is_clean() {
        let table = RuleTable::builtin();
        assert!(!table.is_empty());
        assert!(table.diagnostics().is_empty());
        assert!(table.get("weak_final_فاعل").is_some());
    }

    impl RuleTable {
        fn apply_raw(&self, key: &str, word: &str) -> String {
            self.get(key)
                .unwrap()
                .iter()
                .fold(word.to_string(), |w, op| op.apply(&w))
        }
    }
}
