//! Category Transformation Engine
//!
//! Weak-letter morphology is not compositional: the surface form depends on
//! the category and the slot together. The engine is therefore one explicit
//! `(category, slot)` table; every arm is a small edit on the undiacritized
//! skeleton of the substituted word.
//!
//! | category            | past      | present    | imperative          | agent          | patient              |
//! |---------------------|-----------|------------|---------------------|----------------|----------------------|
//! | regular             | -         | -          | -                   | -              | -                    |
//! | doubled             | -         | -          | drop prefix alef    | -              | -                    |
//! | hamzated (all)      | restore   | restore    | initial: drop hamza | seat hamza     | seat hamza           |
//! | weak initial (و/ي)  | -         | drop glide | drop glide + prefix | -              | -                    |
//! | weak initial (ا)    | -         | -          | -                   | -              | -                    |
//! | weak medial         | glide → ا | -          | first + last only   | glide → ئ      | drop pattern vowel   |
//! | weak final          | -         | ا → و      | drop final          | (rule table)   | waw/alef: final → و  |
//! | doubly weak, split  | -         | drop glide | medial only         | drop final     | contract final       |
//! | doubly weak, joined | -         | drop glide | drop glide + final  | drop final     | contract final       |
//!
//! An initial bare alef is an unmarked hamza, not a glide, so alef-initial
//! roots keep it in every slot. Their irregular imperatives (`خذ`, `كل`)
//! belong in the rule table.

use crate::classifier::{is_weak, Glide, VerbCategory};
use crate::normalizer::{
    strip_diacritics, ALEF, ALEF_MADDA, ALEF_MAQSURA, HAMZA, WAW, WAW_HAMZA, YAA, YAA_HAMZA,
};
use crate::pattern::radical_positions;
use crate::slot::{detect_slot, Slot};

/// Apply the category edits for the slot the scheme represents.
pub fn transform(
    word: &str,
    root: &str,
    category: VerbCategory,
    template: &str,
    scheme_id: &str,
) -> String {
    transform_slot(word, root, category, template, detect_slot(scheme_id, template))
}

/// Same as [`transform`] with the slot already decided.
pub fn transform_slot(
    word: &str,
    root: &str,
    category: VerbCategory,
    template: &str,
    slot: Slot,
) -> String {
    let radicals: Vec<char> = strip_diacritics(root).chars().collect();
    if radicals.len() != 3 || word.chars().count() < 2 {
        return word.to_string();
    }

    let mut skeleton = Skeleton::new(word, template);
    edit(&mut skeleton, &radicals, category, slot);
    skeleton.render()
}

fn edit(w: &mut Skeleton, radicals: &[char], category: VerbCategory, slot: Slot) {
    use Slot as S;
    use VerbCategory as C;

    match (category, slot) {
        (C::Regular | C::Unknown, _) => {}

        (C::Doubled, S::Imperative) => w.drop_imperative_prefix(),
        (C::Doubled, _) => {}

        (C::HamzatedInitial | C::HamzatedMedial | C::HamzatedFinal, _) => {
            edit_hamzated(w, radicals, category, slot)
        }

        (C::WeakInitial(Glide::Waw | Glide::Yaa), S::Present) => w.remove_radical(0),
        (C::WeakInitial(Glide::Waw | Glide::Yaa), S::Imperative) => {
            w.remove_radical(0);
            w.drop_imperative_prefix();
        }
        (C::WeakInitial(_), _) => {}

        (C::WeakMedial(_), S::Past) => w.set_radical(1, ALEF),
        (C::WeakMedial(_), S::Imperative) => w.keep_radicals(&[0, 2]),
        (C::WeakMedial(_), S::AgentNoun) => w.set_radical(1, YAA_HAMZA),
        (C::WeakMedial(_), S::PatientNoun) => w.drop_vowel_after(1),
        (C::WeakMedial(_), _) => {}

        (C::WeakFinal(Glide::Waw | Glide::Alef), S::Present) => w.set_radical(2, WAW),
        (C::WeakFinal(_), S::Imperative) => w.remove_radical(2),
        (C::WeakFinal(Glide::Waw | Glide::Alef), S::PatientNoun) => {
            w.set_radical(2, WAW);
            w.drop_vowel_before(2);
        }
        (C::WeakFinal(_), _) => {}

        (C::DoublyWeakSplit, S::Present) => w.remove_radical(0),
        (C::DoublyWeakSplit, S::Imperative) => w.keep_radicals(&[1]),
        (C::DoublyWeakSplit, S::AgentNoun) => w.remove_radical(2),
        (C::DoublyWeakSplit, S::PatientNoun) => contract_weak_final(w),
        (C::DoublyWeakSplit, _) => {}

        (C::DoublyWeakJoined(_), S::Present) if is_weak(radicals[0]) => w.remove_radical(0),
        (C::DoublyWeakJoined(_), S::Imperative) => {
            if is_weak_final(radicals[2]) {
                w.remove_radical(2);
            }
            if is_weak(radicals[0]) {
                w.remove_radical(0);
                w.drop_imperative_prefix();
            }
        }
        (C::DoublyWeakJoined(_), S::AgentNoun) if is_weak_final(radicals[2]) => {
            w.remove_radical(2)
        }
        (C::DoublyWeakJoined(_), S::PatientNoun) if is_weak_final(radicals[2]) => {
            contract_weak_final(w)
        }
        (C::DoublyWeakJoined(_), _) => {}
    }
}

fn edit_hamzated(w: &mut Skeleton, radicals: &[char], category: VerbCategory, slot: Slot) {
    let position = match category {
        VerbCategory::HamzatedInitial => 0,
        VerbCategory::HamzatedMedial => 1,
        _ => 2,
    };
    w.set_radical(position, radicals[position]);

    match (category, slot) {
        (VerbCategory::HamzatedInitial, Slot::Imperative) => w.remove_radical(0),
        (VerbCategory::HamzatedInitial, Slot::AgentNoun) => {
            // أ + ا -> آ
            if w.letter_after(0) == Some(ALEF) {
                w.drop_vowel_after(0);
                w.set_radical(0, ALEF_MADDA);
            }
        }
        (VerbCategory::HamzatedMedial, Slot::AgentNoun) => {
            if w.letter_before(1) == Some(ALEF) {
                w.set_radical(1, YAA_HAMZA);
            }
        }
        (VerbCategory::HamzatedMedial, Slot::PatientNoun) => {
            if w.letter_after(1) == Some(WAW) {
                w.set_radical(1, WAW_HAMZA);
            }
        }
        (VerbCategory::HamzatedFinal, Slot::AgentNoun) => w.set_radical(2, YAA_HAMZA),
        (VerbCategory::HamzatedFinal, Slot::PatientNoun) => {
            if w.letter_before(2) == Some(WAW) {
                w.set_radical(2, HAMZA);
            }
        }
        _ => {}
    }
}

/// مَفْعُول over a weak final radical: the pattern's long vowel merges into
/// the radical (موقوى -> موقي، مطووى -> مطوي).
fn contract_weak_final(w: &mut Skeleton) {
    let Some(last) = w.radical(2) else {
        return;
    };
    w.drop_vowel_before(2);
    let glide = if matches!(last, WAW | ALEF) { WAW } else { YAA };
    w.set_radical(2, glide);
}

fn is_weak_final(ch: char) -> bool {
    is_weak(ch) || ch == ALEF_MAQSURA
}

/// Undiacritized word with the offsets of its three radicals.
struct Skeleton {
    letters: Vec<char>,
    radicals: [Option<usize>; 3],
}

impl Skeleton {
    fn new(word: &str, template: &str) -> Self {
        let letters: Vec<char> = strip_diacritics(word).chars().collect();
        let template = strip_diacritics(template);
        // offsets only line up when substitution was one-to-one
        let radicals = if template.chars().count() == letters.len() {
            radical_positions(&template)
        } else {
            [None; 3]
        };
        Self { letters, radicals }
    }

    fn render(&self) -> String {
        self.letters.iter().collect()
    }

    fn radical(&self, n: usize) -> Option<char> {
        self.radicals[n].map(|idx| self.letters[idx])
    }

    fn is_radical(&self, idx: usize) -> bool {
        self.radicals.contains(&Some(idx))
    }

    fn set_radical(&mut self, n: usize, ch: char) {
        if let Some(idx) = self.radicals[n] {
            self.letters[idx] = ch;
        }
    }

    fn letter_before(&self, n: usize) -> Option<char> {
        let idx = self.radicals[n]?.checked_sub(1)?;
        Some(self.letters[idx])
    }

    fn letter_after(&self, n: usize) -> Option<char> {
        let idx = self.radicals[n]? + 1;
        self.letters.get(idx).copied()
    }

    fn remove_at(&mut self, idx: usize) {
        if idx >= self.letters.len() {
            return;
        }
        self.letters.remove(idx);
        for slot in self.radicals.iter_mut() {
            *slot = match *slot {
                Some(pos) if pos == idx => None,
                Some(pos) if pos > idx => Some(pos - 1),
                other => other,
            };
        }
    }

    fn remove_radical(&mut self, n: usize) {
        if let Some(idx) = self.radicals[n] {
            self.remove_at(idx);
        }
    }

    /// Drop a pattern long vowel (ا، و، ي) sitting right after radical `n`.
    fn drop_vowel_after(&mut self, n: usize) {
        let Some(idx) = self.radicals[n].map(|pos| pos + 1) else {
            return;
        };
        if idx < self.letters.len() && !self.is_radical(idx) && is_weak(self.letters[idx]) {
            self.remove_at(idx);
        }
    }

    /// Drop a pattern long vowel (ا، و، ي) sitting right before radical `n`.
    fn drop_vowel_before(&mut self, n: usize) {
        let Some(idx) = self.radicals[n].and_then(|pos| pos.checked_sub(1)) else {
            return;
        };
        if !self.is_radical(idx) && is_weak(self.letters[idx]) {
            self.remove_at(idx);
        }
    }

    /// Remove the connecting alef of اِفْعَلْ once it no longer precedes a
    /// consonant cluster.
    fn drop_imperative_prefix(&mut self) {
        if self.letters.first() == Some(&ALEF) && !self.is_radical(0) {
            self.remove_at(0);
        }
    }

    /// Reduce the word to the listed radicals, in word order.
    fn keep_radicals(&mut self, keep: &[usize]) {
        let mut offsets: Vec<usize> = keep.iter().filter_map(|n| self.radicals[*n]).collect();
        if offsets.is_empty() {
            return;
        }
        offsets.sort_unstable();

        let letters: Vec<char> = offsets.iter().map(|idx| self.letters[*idx]).collect();
        let mut radicals = [None; 3];
        for n in keep {
            if let Some(old) = self.radicals[*n] {
                radicals[*n] = offsets.iter().position(|idx| *idx == old);
            }
        }
        self.letters = letters;
        self.radicals = radicals;
    }
}
