//! A `(speaker, text)` pair that needs audio.

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisJob {
    pub speaker: String,
    pub text: String,
    pub fingerprint: Fingerprint,
    /// Nesting depth in the script: 0 for top-level turns.
    pub depth: usize,
}

impl SynthesisJob {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self::at_depth(speaker, text, 0)
    }

    pub(crate) fn at_depth(speaker: impl Into<String>, text: impl Into<String>, depth: usize) -> Self {
        let speaker = speaker.into();
        let text = text.into();
        let fingerprint = Fingerprint::of(&speaker, &text);
        Self {
            speaker,
            text,
            fingerprint,
            depth,
        }
    }

    pub fn is_overlap(&self) -> bool {
        self.depth > 0
    }
}
