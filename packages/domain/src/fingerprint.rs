//! Deterministic content key for a synthesized line.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Separates speaker from text so `("ab", "c")` and `("a", "bc")` differ.
const FIELD_SEPARATOR: u8 = 0x1f;

/// SHA-256 of `(speaker, text)` plus a filesystem-safe speaker prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint {
    speaker: String,
    digest: String,
}

impl Fingerprint {
    pub fn of(speaker: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(speaker.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(text.as_bytes());

        let digest = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();

        Self {
            speaker: sanitize(speaker),
            digest,
        }
    }

    /// Lowercase hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// `{speaker}_{digest}`, used as the cached clip's file stem.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.speaker, self.digest)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

fn sanitize(speaker: &str) -> String {
    let cleaned: String = speaker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(32)
        .collect();
    if cleaned.is_empty() {
        "anon".to_string()
    } else {
        cleaned
    }
}
