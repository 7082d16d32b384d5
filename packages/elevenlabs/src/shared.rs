//! Wire enums shared by the ElevenLabs endpoints.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Synthesis model, serialized as the API's `model_id`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, Display, EnumString, EnumIter,
)]
pub enum Model {
    #[default]
    #[serde(rename = "eleven_monolingual_v1")]
    #[strum(serialize = "eleven_monolingual_v1")]
    ElevenMonolingualV1,
    #[serde(rename = "eleven_multilingual_v2")]
    #[strum(serialize = "eleven_multilingual_v2")]
    ElevenMultilingualV2,
    #[serde(rename = "eleven_turbo_v2")]
    #[strum(serialize = "eleven_turbo_v2")]
    ElevenTurboV2,
    #[serde(rename = "eleven_turbo_v2_5")]
    #[strum(serialize = "eleven_turbo_v2_5")]
    ElevenTurboV2_5,
    #[serde(rename = "eleven_flash_v2_5")]
    #[strum(serialize = "eleven_flash_v2_5")]
    ElevenFlashV2_5,
}

/// `output_format` query parameter.
///
/// MP3 responses are cached as-is. Raw PCM responses carry no header, so
/// they are wrapped into WAV before they reach the cache.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, Display, EnumString, EnumIter,
)]
pub enum OutputFormat {
    #[serde(rename = "mp3_22050_32")]
    #[strum(serialize = "mp3_22050_32")]
    Mp3_22050Hz32kbps,
    #[serde(rename = "mp3_44100_64")]
    #[strum(serialize = "mp3_44100_64")]
    Mp3_44100Hz64kbps,
    #[serde(rename = "mp3_44100_96")]
    #[strum(serialize = "mp3_44100_96")]
    Mp3_44100Hz96kbps,
    #[default]
    #[serde(rename = "mp3_44100_128")]
    #[strum(serialize = "mp3_44100_128")]
    Mp3_44100Hz128kbps,
    #[serde(rename = "mp3_44100_192")]
    #[strum(serialize = "mp3_44100_192")]
    Mp3_44100Hz192kbps,
    #[serde(rename = "pcm_16000")]
    #[strum(serialize = "pcm_16000")]
    Pcm16000Hz,
    #[serde(rename = "pcm_22050")]
    #[strum(serialize = "pcm_22050")]
    Pcm22050Hz,
    #[serde(rename = "pcm_24000")]
    #[strum(serialize = "pcm_24000")]
    Pcm24000Hz,
    #[serde(rename = "pcm_44100")]
    #[strum(serialize = "pcm_44100")]
    Pcm44100Hz,
}

impl OutputFormat {
    /// Sample rate of headerless PCM formats; `None` for encoded formats.
    pub fn pcm_sample_rate(self) -> Option<u32> {
        match self {
            Self::Pcm16000Hz => Some(16_000),
            Self::Pcm22050Hz => Some(22_050),
            Self::Pcm24000Hz => Some(24_000),
            Self::Pcm44100Hz => Some(44_100),
            _ => None,
        }
    }

    /// Extension of the bytes handed to the cache.
    pub fn extension(self) -> &'static str {
        if self.pcm_sample_rate().is_some() {
            "wav"
        } else {
            "mp3"
        }
    }

    /// Value of the `Accept` header for this format.
    pub fn accept(self) -> &'static str {
        if self.pcm_sample_rate().is_some() {
            "audio/pcm"
        } else {
            "audio/mpeg"
        }
    }
}
