//! The derivation pipeline: expand, substitute, transform, override.

use serde::Serialize;

use crate::classifier::VerbCategory;
use crate::expander::expand;
use crate::pattern::apply_pattern;
use crate::rules::RuleTable;
use crate::slot::{detect_slot, Slot};
use crate::transform::transform_slot;

/// A derived surface form and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derivation {
    pub word: String,
    pub category: VerbCategory,
    pub slot: Slot,
}

/// Derive the surface form of `root` under one scheme. `category` must be the
/// classifier's verdict for `root`.
pub fn derive(
    root: &str,
    category: VerbCategory,
    scheme_id: &str,
    template: &str,
    rules: &RuleTable,
) -> Derivation {
    let slot = detect_slot(scheme_id, template);
    let expanded = expand(root, category);
    let substituted = apply_pattern(&expanded, template);
    let transformed = transform_slot(&substituted, root, category, template, slot);
    let overridden = rules.apply(&transformed, root, category, slot, scheme_id);

    Derivation {
        word: strip_rule_residue(&overridden),
        category,
        slot,
    }
}

/// A stray `=` can only come from a malformed rule.
fn strip_rule_residue(word: &str) -> String {
    word.chars().filter(|ch| *ch != '=').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    fn derive_with(rules: &RuleTable, root: &str, scheme_id: &str, template: &str) -> String {
        derive(root, classify(root), scheme_id, template, rules).word
    }

    #[test]
    fn builtin_rules_finish_weak_final_agent_nouns() {
        let rules = RuleTable::builtin();
        assert_eq!(derive_with(&rules, "دعا", "فاعل", "فَاعِل"), "داع");
        assert_eq!(derive_with(&rules, "بقي", "فاعل", "فَاعِل"), "باق");
        assert_eq!(derive_with(&RuleTable::empty(), "دعا", "فاعل", "فَاعِل"), "داعا");
    }

    #[test]
    fn exceptions_apply_after_the_engine() {
        let rules = RuleTable::builtin();
        assert_eq!(derive_with(&rules, "رأى", "يفعل", "يَفْعَلُ"), "يرى");
        assert_eq!(derive_with(&rules, "أخذ", "أمر", "اُفْعُلْ"), "خذ");
    }

    #[test]
    fn strips_equals_left_by_a_malformed_rule() {
        let rules = RuleTable::parse("regular_فاعل: replace=ا>=ا\n");
        assert_eq!(derive_with(&rules, "كتب", "فاعل", "فَاعِل"), "كاتب");
    }

    #[test]
    fn reports_slot_and_category() {
        let derivation = derive("قال", classify("قال"), "أمر", "اُفْعُلْ", &RuleTable::empty());
        assert_eq!(derivation.word, "قل");
        assert_eq!(derivation.slot, Slot::Imperative);
        assert_eq!(derivation.category, classify("قال"));
    }
}
