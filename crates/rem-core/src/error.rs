use std::fmt;

use crate::constants::ERROR_EXCERPT_CHARS;

/// Pipeline stage, named in stage failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Normalize,
    Segment,
    Anchors,
    Noetic,
    Qualia,
    Affect,
    Assemble,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Segment => "segment",
            Stage::Anchors => "anchors",
            Stage::Noetic => "noetic",
            Stage::Qualia => "qualia",
            Stage::Affect => "affect",
            Stage::Assemble => "assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForgeError {
    /// Rejected before any stage ran: malformed context or configuration.
    Input(String),
    /// A stage failed; no record was produced.
    Stage {
        stage: Stage,
        /// Leading excerpt of the normalized input.
        input: String,
        message: String,
    },
}

impl ForgeError {
    pub(crate) fn stage(stage: Stage, input: &str, message: impl Into<String>) -> Self {
        ForgeError::Stage {
            stage,
            input: excerpt(input),
            message: message.into(),
        }
    }
}

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForgeError::Input(msg) => write!(f, "invalid input: {msg}"),
            ForgeError::Stage {
                stage,
                input,
                message,
            } => write!(f, "stage '{stage}' failed on {input:?}: {message}"),
        }
    }
}

impl std::error::Error for ForgeError {}

pub type Result<T> = std::result::Result<T, ForgeError>;

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(ERROR_EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
