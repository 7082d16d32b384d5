//! # Narrator
//!
//! Turns a multi-speaker dialogue script into one audio track.
//!
//! Every line of the script (overlapping interjections included) is
//! synthesized by a [`SpeechProvider`](narrator_domain::SpeechProvider)
//! behind a content-addressed [`ClipCache`], with bounded concurrency and
//! exponential backoff. The cached clips are then joined in script order:
//! consecutive turns are crossfaded and overlaps are mixed into the tail of
//! the line they interrupt. The result is written as a WAV file.
//!
//! Lines that cannot be voiced degrade the track; they never fail it.

pub mod assembler;
pub mod audio;
pub mod cache;
pub mod config;
mod error;
pub mod pipeline;
pub mod retry;
pub mod setup;
pub mod synthesizer;

pub use assembler::{AssembledTrack, AssemblerSettings, AudioAssembler, ClipBank, LineClip, SkipCause};
pub use cache::ClipCache;
pub use config::NarratorConfig;
pub use error::{NarratorError, Result};
pub use pipeline::{NarrationReport, Narrator};
pub use retry::RetryPolicy;
pub use synthesizer::{JobFailure, JobOutcome, SkipReason, SpeechSynthesizer, SynthesisReport};
