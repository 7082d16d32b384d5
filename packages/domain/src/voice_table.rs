//! Speaker name → provider voice mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::voice_id::VoiceId;

/// Stock narrators shipped with the pipeline.
const DEFAULT_VOICES: &[(&str, &str)] = &[
    ("Jessica", "21m00Tcm4TlvDq8ikWAM"), // female, soft and caring
    ("Michael", "8iDUAV5slUpRv30f3cyz"), // male, American, casual
    ("David", "8iDUAV5slUpRv30f3cyz"),   // male, American, friendly
    ("Emily", "21m00Tcm4TlvDq8ikWAM"),   // female, American, expressive
];

/// Static lookup table handed to the synthesizer at startup.
///
/// Lookups are exact and case-sensitive: a script speaker either has a
/// voice or its lines are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceTable(BTreeMap<String, VoiceId>);

impl VoiceTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_voice(mut self, speaker: impl Into<String>, voice: impl Into<String>) -> Self {
        self.insert(speaker, voice);
        self
    }

    pub fn insert(&mut self, speaker: impl Into<String>, voice: impl Into<String>) {
        self.0.insert(speaker.into(), VoiceId::new(voice));
    }

    pub fn resolve(&self, speaker: &str) -> Option<&VoiceId> {
        self.0.get(speaker)
    }

    pub fn speakers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Default for VoiceTable {
    fn default() -> Self {
        DEFAULT_VOICES
            .iter()
            .fold(Self::empty(), |table, (speaker, voice)| table.with_voice(*speaker, *voice))
    }
}

impl<S: Into<String>, V: Into<String>> FromIterator<(S, V)> for VoiceTable {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |table, (speaker, voice)| table.with_voice(speaker, voice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_stock_narrators() {
        let table = VoiceTable::default();
        assert_eq!(table.len(), 4);
        assert_eq!(table.resolve("Jessica").map(VoiceId::id), Some("21m00Tcm4TlvDq8ikWAM"));
        assert!(table.resolve("jessica").is_none());
    }

    #[test]
    fn deserializes_from_plain_map() {
        let table: VoiceTable = serde_json::from_str(r#"{"Host":"abc","Guest":"def"}"#).unwrap();
        assert_eq!(table.resolve("Guest"), Some(&VoiceId::new("def")));
        assert_eq!(table.speakers().collect::<Vec<_>>(), vec!["Guest", "Host"]);
    }
}
