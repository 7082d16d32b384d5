//! PCM editing, decoding and export.

mod clip;
mod decode;
mod resample;
mod wav;

pub use clip::{AudioClip, ms_to_samples};
pub use decode::decode_clip;
pub use resample::resample_mono;
pub use wav::write_wav;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("decode: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    #[error("no decodable audio track")]
    NoAudioTrack,
    #[error("stream does not declare a sample rate")]
    UnknownSampleRate,
    #[error("resample: {0}")]
    Resample(String),
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
