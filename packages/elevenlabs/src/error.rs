use narrator_domain::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElevenLabsError>;

#[derive(Error, Debug)]
pub enum ElevenLabsError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("http error {status}: {body}")]
    HttpError { status: u16, body: String },
    #[error("No ElevenLabs API key found. Set ELEVENLABS_API_KEY, ELEVEN_API_KEY, or ELEVEN_LABS_API_KEY")]
    MissingApiKey,
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("pcm wrapping failed: {0}")]
    PcmWrap(#[from] hound::Error),
}

impl From<ElevenLabsError> for ProviderError {
    fn from(err: ElevenLabsError) -> Self {
        match err {
            ElevenLabsError::HttpError { status, body } => ProviderError::Status { status, body },
            ElevenLabsError::ReqwestError(e) if e.is_builder() => {
                ProviderError::Invalid(e.to_string())
            }
            ElevenLabsError::ReqwestError(e) => ProviderError::Transport(e.to_string()),
            other => ProviderError::Invalid(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_their_status() {
        let err: ProviderError = ElevenLabsError::HttpError {
            status: 429,
            body: "too_many_concurrent_requests".into(),
        }
        .into();
        assert!(err.is_transient());
        assert_eq!(
            err,
            ProviderError::status(429, "too_many_concurrent_requests")
        );
    }

    #[test]
    fn local_errors_are_permanent() {
        let err: ProviderError = ElevenLabsError::InvalidUrl {
            url: "nope".into(),
            reason: "relative URL without a base".into(),
        }
        .into();
        assert!(!err.is_transient());
    }
}
