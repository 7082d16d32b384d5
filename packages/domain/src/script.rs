//! Parsing dialogue scripts as a language model hands them over.

use serde::Deserialize;
use thiserror::Error;

use crate::dialogue_turn::DialogueTurn;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("malformed dialogue script: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An ordered, immutable sequence of top-level turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueScript {
    turns: Vec<DialogueTurn>,
}

/// Either `[...]` or `{"dialogue": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptShape {
    Bare(Vec<DialogueTurn>),
    Wrapped { dialogue: Vec<DialogueTurn> },
}

impl DialogueScript {
    pub fn new(turns: Vec<DialogueTurn>) -> Self {
        Self { turns }
    }

    /// Parse JSON, tolerating a surrounding Markdown code fence.
    pub fn from_json(raw: &str) -> Result<Self, ScriptError> {
        let shape: ScriptShape = serde_json::from_str(strip_code_fence(raw))?;
        let turns = match shape {
            ScriptShape::Bare(turns) => turns,
            ScriptShape::Wrapped { dialogue } => dialogue,
        };
        Ok(Self { turns })
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

}

impl From<Vec<DialogueTurn>> for DialogueScript {
    fn from(turns: Vec<DialogueTurn>) -> Self {
        Self::new(turns)
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
