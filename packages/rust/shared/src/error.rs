//! Error types for markpress.
//!
//! Library crates use [`MarkpressError`] via `thiserror`.
//! The CLI app crate wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all markpress operations.
///
/// Every failure here is treated as a deterministic configuration or
/// environment problem; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum MarkpressError {
    /// Processor specification string does not match the grammar.
    #[error(
        "malformed processor spec '{value}': expected '<processor-path>', \
         'builtin:<name>', '<ext>:<processor-path>', '<ext>:<other-ext>', \
         or '<ext>:builtin:<name>'"
    )]
    MalformedSpec { value: String },

    /// Builtin name not present in the fixed registry.
    #[error("'{name}' is not a builtin processor; must be one of {valid}")]
    UnknownBuiltin { name: String, valid: String },

    /// External-processor path does not resolve to an existing executable file.
    #[error("external processor {path:?} is not an existing executable file")]
    MissingExecutable { path: PathBuf },

    /// External processor could not be started or exited non-zero.
    #[error("external processor {path:?} failed: {message}")]
    ExternalProcessor { path: PathBuf, message: String },

    /// Non-UTF-8 content reached a step that requires text.
    #[error("content of {path:?} is not valid UTF-8: {message}")]
    Encoding { path: PathBuf, message: String },

    /// Footer rendering needs path templates for a provider with none defined.
    #[error("no path templates defined for git provider '{provider}'")]
    UnconfiguredProvider { provider: String },

    /// Git subprocess error.
    #[error("git error: {0}")]
    Git(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MarkpressError>;

impl MarkpressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a git error from any displayable message.
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
