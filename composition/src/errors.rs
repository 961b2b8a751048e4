//! Error type for composition operations.

use std::path::PathBuf;

/// Error type for template and static-resource handling
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("Failed to read report template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read prompt file {path}: {source}")]
    PromptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report template is missing placeholder {0}")]
    MissingPlaceholder(&'static str),
}

/// Result type for composition operations
pub type CompositionResult<T> = Result<T, CompositionError>;
