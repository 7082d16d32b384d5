//! One scripted utterance, possibly interrupted by other speakers.

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// A single line of the dialogue script.
///
/// `overlaps` holds turns spoken concurrently with (cutting into) this one.
/// Overlaps are turns themselves and may carry their own overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub speaker: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlaps: Vec<DialogueTurn>,
}

impl DialogueTurn {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            overlaps: Vec::new(),
        }
    }

    /// Attach an overlapping turn, keeping listed order.
    pub fn with_overlap(mut self, overlap: DialogueTurn) -> Self {
        self.overlaps.push(overlap);
        self
    }

    /// Cache key of this turn's own clip (overlaps excluded).
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.speaker, &self.text)
    }

    pub fn has_overlaps(&self) -> bool {
        !self.overlaps.is_empty()
    }

    /// Number of turns in this subtree, including `self`.
    pub fn line_count(&self) -> usize {
        1 + self.overlaps.iter().map(DialogueTurn::line_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_overlaps_field_defaults_to_empty() {
        let turn: DialogueTurn =
            serde_json::from_str(r#"{"speaker":"Jessica","text":"Hi"}"#).unwrap();
        assert!(!turn.has_overlaps());
        assert_eq!(turn.line_count(), 1);
    }

    #[test]
    fn empty_overlaps_are_not_serialized() {
        let json = serde_json::to_string(&DialogueTurn::new("Michael", "Sure")).unwrap();
        assert!(!json.contains("overlaps"));
    }

    #[test]
    fn line_count_walks_nested_overlaps() {
        let turn = DialogueTurn::new("A", "one")
            .with_overlap(DialogueTurn::new("B", "two").with_overlap(DialogueTurn::new("C", "three")))
            .with_overlap(DialogueTurn::new("D", "four"));
        assert_eq!(turn.line_count(), 4);
    }
}
