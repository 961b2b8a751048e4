//! Critique error taxonomy.
//!
//! Every failure in the pipeline is one of four kinds. Callers branch on
//! `kind()` rather than on message text, and front-ends show
//! `user_message()` in place of results.
//!
//! | Kind          | Detected                       | Effect on a run              |
//! |---------------|--------------------------------|------------------------------|
//! | Validation    | before any network call        | `Failed`, user re-submits    |
//! | Configuration | before any network call        | `Failed`, fix env / `.env`   |
//! | Transport     | during a completion call       | `Failed`, partial output dropped |
//! | Composition   | loading prompts / template     | `Failed`                     |

use std::fmt;

use composition::CompositionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error code carried across the orchestrator boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    Transport,
    Composition,
}

impl ErrorKind {
    /// Type-style name shown in user-facing messages (e.g. `TransportError`).
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Configuration => "ConfigurationError",
            Self::Transport => "TransportError",
            Self::Composition => "CompositionError",
        }
    }

    /// Whether the user can fix this by changing their input alone.
    pub fn is_user_recoverable(self) -> bool {
        matches!(self, Self::Validation)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Configuration => write!(f, "configuration"),
            Self::Transport => write!(f, "transport"),
            Self::Composition => write!(f, "composition"),
        }
    }
}

/// Unified error type for all critique operations.
#[derive(Debug, Error)]
pub enum CritiqueError {
    /// Blank or malformed user input.
    #[error("{0}")]
    Validation(String),

    /// Missing credential or invalid configuration.
    #[error("{0}")]
    Configuration(String),

    /// Network or service failure during a completion call.
    #[error("{0}")]
    Transport(String),

    /// Prompt or template resource could not be loaded.
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

impl CritiqueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Composition(_) => ErrorKind::Composition,
        }
    }

    pub fn missing_credential() -> Self {
        Self::Configuration("OPENAI_API_KEY missing. Check your .env file.".to_string())
    }

    pub fn blank_subject() -> Self {
        Self::Validation("Please enter an idea, plan, or argument first.".to_string())
    }

    pub fn blank_comparison() -> Self {
        Self::Validation("Please provide **both** Idea A and Idea B for comparison.".to_string())
    }

    /// Human-readable message rendered in place of results.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => format!("⚠️ {self}"),
            ErrorKind::Configuration => format!("❌ {self}"),
            kind => format!("❌ Error during analysis: `{}` - {self}", kind.type_name()),
        }
    }
}

/// Serializable error summary stored on a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CritiqueError> for ErrorInfo {
    fn from(err: &CritiqueError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}
