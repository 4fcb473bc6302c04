//! Verb Root Classification
//!
//! Places a trilateral root into one of the traditional morphological
//! categories (صحيح، مضاعف، مهموز، مثال، أجوف، ناقص، لفيف) based on where
//! hamza and weak letters sit and on doubling of the last two radicals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalizer::{
    strip_diacritics, ALEF, ALEF_HAMZA_ABOVE, ALEF_HAMZA_BELOW, ALEF_MADDA, ALEF_MAQSURA, HAMZA,
    WAW, YAA,
};
use crate::MorphError;

/// Hollow roots whose medial alef stands for an underlying yaa (يائي).
/// Any other root spelled with a medial alef is treated as waw-based.
static YAA_HOLLOW_ROOTS: &[&str] = &[
    "باع", "سار", "طار", "صار", "عاش", "مال", "زاد", "غاب", "بات", "سال", "نال", "كال",
    "عاب", "شاب", "ضاق", "جاب", "لان", "هام", "ساح", "فاض", "غار",
];

/// Which semivowel flavors a weak category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glide {
    Waw,
    Yaa,
    Alef,
}

impl Glide {
    pub fn key(&self) -> &'static str {
        match self {
            Glide::Waw => "waw",
            Glide::Yaa => "yaa",
            Glide::Alef => "alef",
        }
    }

    /// The consonantal letter the glide surfaces as.
    pub fn letter(&self) -> char {
        match self {
            Glide::Waw => WAW,
            Glide::Yaa => YAA,
            Glide::Alef => ALEF,
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "waw" => Some(Glide::Waw),
            "yaa" => Some(Glide::Yaa),
            "alef" => Some(Glide::Alef),
            _ => None,
        }
    }
}

/// Morphological category of a trilateral root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VerbCategory {
    Regular,
    Doubled,
    HamzatedInitial,
    HamzatedMedial,
    HamzatedFinal,
    WeakInitial(Glide),
    /// [`classify`] always resolves the glide of a hollow root, so
    /// `WeakMedial(Glide::Alef)` only arrives through a parsed key.
    WeakMedial(Glide),
    WeakFinal(Glide),
    DoublyWeakSplit,
    DoublyWeakJoined(Glide),
    Unknown,
}

impl VerbCategory {
    pub const ALL: [VerbCategory; 18] = [
        VerbCategory::Regular,
        VerbCategory::Doubled,
        VerbCategory::HamzatedInitial,
        VerbCategory::HamzatedMedial,
        VerbCategory::HamzatedFinal,
        VerbCategory::WeakInitial(Glide::Waw),
        VerbCategory::WeakInitial(Glide::Yaa),
        VerbCategory::WeakInitial(Glide::Alef),
        VerbCategory::WeakMedial(Glide::Waw),
        VerbCategory::WeakMedial(Glide::Yaa),
        VerbCategory::WeakMedial(Glide::Alef),
        VerbCategory::WeakFinal(Glide::Yaa),
        VerbCategory::WeakFinal(Glide::Waw),
        VerbCategory::WeakFinal(Glide::Alef),
        VerbCategory::DoublyWeakSplit,
        VerbCategory::DoublyWeakJoined(Glide::Waw),
        VerbCategory::DoublyWeakJoined(Glide::Yaa),
        VerbCategory::Unknown,
    ];

    /// Coarse bucket shared by every flavor of a category; used to key
    /// category-wide irregular rules.
    pub fn prefix(&self) -> &'static str {
        match self {
            VerbCategory::Regular => "regular",
            VerbCategory::Doubled => "doubled",
            VerbCategory::HamzatedInitial => "hamzated_initial",
            VerbCategory::HamzatedMedial => "hamzated_medial",
            VerbCategory::HamzatedFinal => "hamzated_final",
            VerbCategory::WeakInitial(_) => "weak_initial",
            VerbCategory::WeakMedial(_) => "weak_medial",
            VerbCategory::WeakFinal(_) => "weak_final",
            VerbCategory::DoublyWeakSplit => "doubly_weak_split",
            VerbCategory::DoublyWeakJoined(_) => "doubly_weak_joined",
            VerbCategory::Unknown => "unknown",
        }
    }

    /// Full key including the flavor, e.g. `weak_medial_waw`.
    pub fn key(&self) -> String {
        match self.glide() {
            Some(glide) => format!("{}_{}", self.prefix(), glide.key()),
            None => self.prefix().to_string(),
        }
    }

    pub fn glide(&self) -> Option<Glide> {
        match self {
            VerbCategory::WeakInitial(glide)
            | VerbCategory::WeakMedial(glide)
            | VerbCategory::WeakFinal(glide)
            | VerbCategory::DoublyWeakJoined(glide) => Some(*glide),
            _ => None,
        }
    }

    /// Traditional Arabic name of the category.
    pub fn label(&self) -> &'static str {
        match self {
            VerbCategory::Regular => "صحيح سالم",
            VerbCategory::Doubled => "مضاعف",
            VerbCategory::HamzatedInitial => "مهموز الفاء",
            VerbCategory::HamzatedMedial => "مهموز العين",
            VerbCategory::HamzatedFinal => "مهموز اللام",
            VerbCategory::WeakInitial(Glide::Waw) => "مثال واوي",
            VerbCategory::WeakInitial(Glide::Yaa) => "مثال يائي",
            VerbCategory::WeakInitial(Glide::Alef) => "مثال",
            VerbCategory::WeakMedial(Glide::Waw) => "أجوف واوي",
            VerbCategory::WeakMedial(Glide::Yaa) => "أجوف يائي",
            VerbCategory::WeakMedial(Glide::Alef) => "أجوف",
            VerbCategory::WeakFinal(Glide::Yaa) => "ناقص يائي",
            VerbCategory::WeakFinal(Glide::Waw) | VerbCategory::WeakFinal(Glide::Alef) => {
                "ناقص واوي"
            }
            VerbCategory::DoublyWeakSplit => "لفيف مفروق",
            VerbCategory::DoublyWeakJoined(Glide::Yaa) => "لفيف مقرون يائي",
            VerbCategory::DoublyWeakJoined(_) => "لفيف مقرون واوي",
            VerbCategory::Unknown => "غير مصنف",
        }
    }

    pub fn is_hamzated(&self) -> bool {
        matches!(
            self,
            VerbCategory::HamzatedInitial
                | VerbCategory::HamzatedMedial
                | VerbCategory::HamzatedFinal
        )
    }
}

impl fmt::Display for VerbCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for VerbCategory {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let plain = match s {
            "regular" => Some(VerbCategory::Regular),
            "doubled" => Some(VerbCategory::Doubled),
            "hamzated_initial" => Some(VerbCategory::HamzatedInitial),
            "hamzated_medial" => Some(VerbCategory::HamzatedMedial),
            "hamzated_final" => Some(VerbCategory::HamzatedFinal),
            "doubly_weak_split" => Some(VerbCategory::DoublyWeakSplit),
            "unknown" => Some(VerbCategory::Unknown),
            _ => None,
        };
        if let Some(category) = plain {
            return Ok(category);
        }

        let (prefix, flavor) = s
            .rsplit_once('_')
            .ok_or_else(|| MorphError::UnknownCategoryKey(s.to_string()))?;
        let glide =
            Glide::from_key(flavor).ok_or_else(|| MorphError::UnknownCategoryKey(s.to_string()))?;
        match (prefix, glide) {
            ("weak_initial", glide) => Ok(VerbCategory::WeakInitial(glide)),
            ("weak_medial", glide) => Ok(VerbCategory::WeakMedial(glide)),
            ("weak_final", glide) => Ok(VerbCategory::WeakFinal(glide)),
            ("doubly_weak_joined", Glide::Waw | Glide::Yaa) => {
                Ok(VerbCategory::DoublyWeakJoined(glide))
            }
            _ => Err(MorphError::UnknownCategoryKey(s.to_string())),
        }
    }
}

impl From<VerbCategory> for String {
    fn from(value: VerbCategory) -> Self {
        value.key()
    }
}

impl TryFrom<String> for VerbCategory {
    type Error = MorphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Glottal stop or one of its alef seats.
pub fn is_hamza(ch: char) -> bool {
    matches!(ch, HAMZA | ALEF_HAMZA_ABOVE | ALEF_HAMZA_BELOW | ALEF_MADDA)
}

/// Alef, waw or yaa. Alef maqsura only counts in final position, see [`classify`].
pub fn is_weak(ch: char) -> bool {
    matches!(ch, ALEF | WAW | YAA)
}

fn is_weak_final(ch: char) -> bool {
    is_weak(ch) || ch == ALEF_MAQSURA
}

/// Classify a root. Anything that is not exactly three letters (after
/// stripping short vowels) is [`VerbCategory::Unknown`].
pub fn classify(root: &str) -> VerbCategory {
    let root = strip_diacritics(root);
    let letters: Vec<char> = root.chars().collect();
    let [first, second, third] = match letters.as_slice() {
        [a, b, c] => [*a, *b, *c],
        _ => return VerbCategory::Unknown,
    };

    if second == third && !is_weak_final(second) {
        return VerbCategory::Doubled;
    }

    match [is_hamza(first), is_hamza(second), is_hamza(third)] {
        [true, false, false] => return VerbCategory::HamzatedInitial,
        [false, true, false] => return VerbCategory::HamzatedMedial,
        [false, false, true] => return VerbCategory::HamzatedFinal,
        [false, false, false] => {}
        _ => return VerbCategory::Unknown,
    }

    match [is_weak(first), is_weak(second), is_weak_final(third)] {
        [true, false, true] => VerbCategory::DoublyWeakSplit,
        [true, true, _] | [_, true, true] => {
            VerbCategory::DoublyWeakJoined(joined_glide(second, third))
        }
        [true, false, false] => VerbCategory::WeakInitial(letter_glide(first)),
        [false, true, false] => VerbCategory::WeakMedial(hollow_glide(&root, second)),
        [false, false, true] => VerbCategory::WeakFinal(final_glide(third)),
        [false, false, false] => VerbCategory::Regular,
    }
}

fn letter_glide(ch: char) -> Glide {
    match ch {
        WAW => Glide::Waw,
        YAA | ALEF_MAQSURA => Glide::Yaa,
        _ => Glide::Alef,
    }
}

fn final_glide(ch: char) -> Glide {
    letter_glide(ch)
}

fn hollow_glide(root: &str, medial: char) -> Glide {
    match medial {
        ALEF if YAA_HOLLOW_ROOTS.contains(&root) => Glide::Yaa,
        ALEF => Glide::Waw,
        other => letter_glide(other),
    }
}

fn joined_glide(second: char, third: char) -> Glide {
    match third {
        YAA | ALEF_MAQSURA => Glide::Yaa,
        WAW | ALEF => Glide::Waw,
        _ if second == YAA => Glide::Yaa,
        _ => Glide::Waw,
    }
}
