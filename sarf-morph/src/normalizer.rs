//! Arabic Text Normalization
//!
//! Canonicalizes Arabic text for equality comparison:
//! - Diacritics (harakat) removal
//! - Tatweel (kashida) removal
//! - Alef/hamza unification (two policies, see [`AlefPolicy`])
//! - Taa marbuta to haa, alef maqsura to yaa

use serde::{Deserialize, Serialize};

pub const ALEF: char = '\u{0627}';
pub const ALEF_HAMZA_ABOVE: char = '\u{0623}';
pub const ALEF_HAMZA_BELOW: char = '\u{0625}';
pub const ALEF_MADDA: char = '\u{0622}';
pub const ALEF_WASLA: char = '\u{0671}';
pub const HAMZA: char = '\u{0621}';
pub const WAW: char = '\u{0648}';
pub const WAW_HAMZA: char = '\u{0624}';
pub const YAA: char = '\u{064A}';
pub const YAA_HAMZA: char = '\u{0626}';
pub const ALEF_MAQSURA: char = '\u{0649}';
pub const TAA_MARBUTA: char = '\u{0629}';
pub const HAA: char = '\u{0647}';
pub const TATWEEL: char = '\u{0640}';

/// How alef-with-hamza shapes are unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlefPolicy {
    /// Every alef shape (أ إ آ ٱ) becomes bare alef.
    #[default]
    Collapse,
    /// Hamza-carrying shapes become أ; bare alef stays distinct.
    PreserveHamza,
}

/// Arabic text normalizer.
#[derive(Debug, Clone)]
pub struct ArabicNormalizer {
    /// Remove diacritical marks (harakat)
    pub remove_diacritics: bool,
    /// Remove tatweel (kashida)
    pub remove_tatweel: bool,
    /// Alef/hamza unification policy
    pub alef_policy: AlefPolicy,
    /// Normalize alef maqsura to yaa
    pub normalize_yaa: bool,
    /// Normalize taa marbuta to haa
    pub normalize_taa_marbuta: bool,
}

impl Default for ArabicNormalizer {
    fn default() -> Self {
        Self {
            remove_diacritics: true,
            remove_tatweel: true,
            alef_policy: AlefPolicy::Collapse,
            normalize_yaa: true,
            normalize_taa_marbuta: true,
        }
    }
}

impl ArabicNormalizer {
    /// Create a normalizer with the canonical comparison policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that keeps hamza distinct from bare alef.
    pub fn strict() -> Self {
        Self {
            alef_policy: AlefPolicy::PreserveHamza,
            ..Self::default()
        }
    }

    /// Normalize Arabic text.
    pub fn normalize(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());

        for ch in text.trim().chars() {
            if self.remove_diacritics && is_diacritic(ch) {
                continue;
            }

            if self.remove_tatweel && ch == TATWEEL {
                continue;
            }

            if is_alef_variant(ch) || ch == ALEF_WASLA {
                result.push(self.unify_alef(ch));
                continue;
            }

            if self.normalize_yaa && ch == ALEF_MAQSURA {
                result.push(YAA);
                continue;
            }

            if self.normalize_taa_marbuta && ch == TAA_MARBUTA {
                result.push(HAA);
                continue;
            }

            result.push(ch);
        }

        result.trim().to_string()
    }

    fn unify_alef(&self, ch: char) -> char {
        match self.alef_policy {
            AlefPolicy::Collapse => ALEF,
            AlefPolicy::PreserveHamza if ch == ALEF_WASLA => ALEF,
            AlefPolicy::PreserveHamza => ALEF_HAMZA_ABOVE,
        }
    }
}

/// Normalize with the canonical policy used for every equality comparison.
pub fn normalize(text: &str) -> String {
    ArabicNormalizer::new().normalize(text)
}

/// Strip short vowels and tatweel, leaving every letter untouched.
pub fn strip_diacritics(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|ch| !is_diacritic(*ch) && *ch != TATWEEL)
        .collect()
}

/// Check if a character is an Arabic diacritical mark.
pub fn is_diacritic(ch: char) -> bool {
    matches!(ch,
        '\u{064B}'..='\u{0652}' | // Fathatan to Sukun
        '\u{0670}'                // Superscript alef
    )
}

/// Check if a character is an alef carrying hamza or madda.
pub fn is_alef_variant(ch: char) -> bool {
    matches!(ch, ALEF_HAMZA_ABOVE | ALEF_HAMZA_BELOW | ALEF_MADDA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_harakat() {
        assert_eq!(normalize("كَتَبَ"), "كتب");
        assert_eq!(normalize("مَفْعُول"), "مفعول");
    }

    #[test]
    fn collapses_alef_variants() {
        assert_eq!(normalize("أكل"), "اكل");
        assert_eq!(normalize("آكل"), "اكل");
        assert_eq!(normalize("إسلام"), "اسلام");
    }

    #[test]
    fn strict_policy_keeps_hamza_distinct() {
        let strict = ArabicNormalizer::strict();
        assert_eq!(strict.normalize("آكل"), "أكل");
        assert_eq!(strict.normalize("إكرام"), "أكرام");
        assert_ne!(strict.normalize("أكل"), strict.normalize("اكل"));
    }

    #[test]
    fn maps_taa_marbuta_and_alef_maqsura() {
        assert_eq!(normalize("مدرسة"), "مدرسه");
        assert_eq!(normalize("وقى"), "وقي");
    }

    #[test]
    fn trims_and_handles_empty_input() {
        assert_eq!(normalize("  كتب \n"), "كتب");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn strip_diacritics_keeps_letters() {
        assert_eq!(strip_diacritics("أَكَلَ"), "أكل");
        assert_eq!(strip_diacritics("العـــربية"), "العربية");
    }
}
