//! Seam between the pipeline and a text-to-speech backend.

use std::future::Future;
use thiserror::Error;

use crate::voice_id::VoiceId;

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Connection, timeout or body-read failure.
    #[error("transport: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    /// The request could not be built or sent as asked.
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl ProviderError {
    pub const TOO_MANY_REQUESTS: u16 = 429;

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Worth retrying: network trouble or rate limiting. Every other status
    /// is a permanent failure for this request.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == Self::TOO_MANY_REQUESTS,
            Self::Invalid(_) => false,
        }
    }
}

/// Produces encoded audio for one line of text in one voice.
pub trait SpeechProvider: Send + Sync {
    fn synthesize(
        &self,
        voice: &VoiceId,
        text: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// File extension of the container `synthesize` returns.
    fn clip_extension(&self) -> &str {
        "mp3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_and_429_are_transient() {
        assert!(ProviderError::Transport("reset".into()).is_transient());
        assert!(ProviderError::status(429, "slow down").is_transient());
        assert!(!ProviderError::status(400, "bad").is_transient());
        assert!(!ProviderError::status(401, "key").is_transient());
        assert!(!ProviderError::status(500, "oops").is_transient());
        assert!(!ProviderError::Invalid("no url".into()).is_transient());
    }
}
