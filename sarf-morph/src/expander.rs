//! Hollow root expansion.
//!
//! A hollow (أجوف) root is usually cited in its past-tense spelling with a
//! long alef in second position (قال، باع). Non-past patterns need the
//! underlying glide instead (قول، بيع).

use crate::classifier::{Glide, VerbCategory};
use crate::normalizer::ALEF;

/// Replace a medial alef with the glide the category says it stands for.
/// Every other root passes through unchanged.
pub fn expand(root: &str, category: VerbCategory) -> String {
    let glide = match category {
        VerbCategory::WeakMedial(glide @ (Glide::Waw | Glide::Yaa)) => glide,
        _ => return root.to_string(),
    };

    let mut letters: Vec<char> = root.chars().collect();
    if letters.len() == 3 && letters[1] == ALEF {
        letters[1] = glide.letter();
    }
    letters.into_iter().collect()
}
