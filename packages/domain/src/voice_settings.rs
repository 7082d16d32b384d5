//! Provider-neutral synthesis parameters.

use serde::{Deserialize, Serialize};

/// Per-request voice tuning.
///
/// `stability` and `similarity_boost` range from 0.0 to 1.0 and are
/// clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl VoiceSettings {
    pub fn new(stability: f32, similarity_boost: f32) -> Self {
        Self {
            stability: stability.clamp(0.0, 1.0),
            similarity_boost: similarity_boost.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: f32) -> Self {
        self.style = style.clamp(0.0, 1.0);
        self
    }

    pub fn with_speaker_boost(mut self, enabled: bool) -> Self {
        self.use_speaker_boost = enabled;
        self
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}
