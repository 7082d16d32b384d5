//! ElevenLabs speech provider for fluent-narrator
//!
//! Wraps the ElevenLabs text-to-speech REST endpoint behind the
//! [`narrator_domain::SpeechProvider`] seam so the pipeline never sees
//! HTTP details.
//!
//! # Usage
//!
//! ```no_run
//! use narrator_domain::{SpeechProvider, VoiceId};
//! use narrator_elevenlabs::{ElevenLabsClient, ElevenLabsSpeech};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ElevenLabsClient::from_env()?;
//!     let speech = ElevenLabsSpeech::new(client);
//!     let mp3 = speech
//!         .synthesize(&VoiceId::new("21m00Tcm4TlvDq8ikWAM"), "Welcome back!")
//!         .await?;
//!     println!("{} bytes", mp3.len());
//!     Ok(())
//! }
//! ```

mod client;
pub mod endpoints;
mod error;
mod shared;
mod speech;

pub use client::{ClientConfig, ElevenLabsClient};
pub use error::{ElevenLabsError, Result};
pub use shared::{Model, OutputFormat};
pub use speech::ElevenLabsSpeech;
