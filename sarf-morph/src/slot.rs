//! Grammatical slot of a scheme.

use serde::{Deserialize, Serialize};

use crate::normalizer::{normalize, strip_diacritics, ALEF, ALEF_HAMZA_ABOVE, YAA};

/// The grammatical role a scheme produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Past,
    Present,
    Imperative,
    AgentNoun,
    PatientNoun,
    Unknown,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Past => "past",
            Slot::Present => "present",
            Slot::Imperative => "imperative",
            Slot::AgentNoun => "agent_noun",
            Slot::PatientNoun => "patient_noun",
            Slot::Unknown => "unknown",
        }
    }
}

/// Decide the slot from the scheme identifier, falling back to the shape of
/// the template when the identifier is not one of the curated ones.
pub fn detect_slot(scheme_id: &str, template: &str) -> Slot {
    slot_from_id(scheme_id).unwrap_or_else(|| slot_from_template(template))
}

fn slot_from_id(scheme_id: &str) -> Option<Slot> {
    let slot = match normalize(scheme_id).to_lowercase().as_str() {
        "فعل" | "past" | "base" => Slot::Past,
        "يفعل" | "present" => Slot::Present,
        "امر" | "imperative" => Slot::Imperative,
        "فاعل" | "agent" | "agent_noun" => Slot::AgentNoun,
        "مفعول" | "patient" | "patient_noun" => Slot::PatientNoun,
        _ => return None,
    };
    Some(slot)
}

fn slot_from_template(template: &str) -> Slot {
    let skeleton = strip_diacritics(template);
    let first = skeleton.chars().next();

    if skeleton.contains("فاعل") {
        Slot::AgentNoun
    } else if skeleton.starts_with('م') && skeleton.contains("فعول") {
        Slot::PatientNoun
    } else if first == Some(ALEF) && skeleton.chars().count() > 3 {
        Slot::Imperative
    } else if matches!(first, Some(YAA | 'ت' | 'ن' | ALEF_HAMZA_ABOVE)) {
        Slot::Present
    } else if skeleton == "فعل" {
        Slot::Past
    } else {
        Slot::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_ids_win() {
        assert_eq!(detect_slot("فعل", "فَعَلَ"), Slot::Past);
        assert_eq!(detect_slot("يفعل", "يَفْعَلُ"), Slot::Present);
        assert_eq!(detect_slot("أمر", "اِفْعَلْ"), Slot::Imperative);
        assert_eq!(detect_slot("فاعل", "فَاعِل"), Slot::AgentNoun);
        assert_eq!(detect_slot("مفعول", "مَفْعُول"), Slot::PatientNoun);
        // id beats a misleading template
        assert_eq!(detect_slot("فاعل", "مفعول"), Slot::AgentNoun);
    }

    #[test]
    fn falls_back_to_template_shape() {
        assert_eq!(detect_slot("agent2", "فاعل"), Slot::AgentNoun);
        assert_eq!(detect_slot("p2", "مَفْعُول"), Slot::PatientNoun);
        assert_eq!(detect_slot("imp", "اُفْعُلْ"), Slot::Imperative);
        assert_eq!(detect_slot("pres-we", "نفعل"), Slot::Present);
        assert_eq!(detect_slot("x", "فعل"), Slot::Past);
        assert_eq!(detect_slot("x", "فعّال"), Slot::Unknown);
    }
}
