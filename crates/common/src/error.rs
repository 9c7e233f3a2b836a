//! Error types shared across ProClip crates.

use std::path::PathBuf;

/// Top-level error type for ProClip operations.
#[derive(Debug, thiserror::Error)]
pub enum ProclipError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Source unreadable: {}: {}", .path.display(), .message)]
    SourceUnreadable { path: PathBuf, message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("A clip job is already running")]
    JobActive,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ProclipError.
pub type ProclipResult<T> = Result<T, ProclipError>;

impl ProclipError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn source_unreadable(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error was raised before any work could start.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
