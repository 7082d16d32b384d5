//! Request-level failures of the narration pipeline.
//!
//! Line-level problems (unmapped voices, provider errors, missing clips)
//! never surface here; they are recorded in the synthesis and assembly
//! reports instead.

use narrator_domain::ScriptError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NarratorError>;

#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration: {0}")]
    Config(String),
    #[error("export to {} failed: {reason}", path.display())]
    Export { path: PathBuf, reason: String },
    #[error("no dialogue to assemble")]
    EmptyDialogue,
    #[error("none of the {turns} dialogue turns produced audio")]
    NothingAssembled { turns: usize },
    #[error(transparent)]
    Script(#[from] ScriptError),
}

impl NarratorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
