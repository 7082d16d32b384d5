//! # Narrator Domain
//!
//! Shared domain objects for the fluent-narrator pipeline.
//!
//! This crate holds the types that both the provider crates and the
//! pipeline crate speak: the recursive dialogue script, the flat synthesis
//! jobs derived from it, the content fingerprint that keys the clip cache,
//! the speaker → voice table and the [`SpeechProvider`] seam.

pub mod dialogue_turn;
pub mod fingerprint;
pub mod flatten;
pub mod script;
pub mod speech_provider;
pub mod synthesis_job;
pub mod voice_id;
pub mod voice_settings;
pub mod voice_table;

pub use dialogue_turn::DialogueTurn;
pub use fingerprint::Fingerprint;
pub use flatten::flatten;
pub use script::{DialogueScript, ScriptError};
pub use speech_provider::{ProviderError, SpeechProvider};
pub use synthesis_job::SynthesisJob;
pub use voice_id::VoiceId;
pub use voice_settings::VoiceSettings;
pub use voice_table::VoiceTable;
