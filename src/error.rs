//! Engine error taxonomy.
//!
//! Every fallible engine operation returns [`EngineError`]. Handler bodies
//! (directives, plugin hooks, renderers) return `anyhow::Result`, and their
//! failures are wrapped into the matching variant with the cause kept as
//! `source`, so the full message chain survives to the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the engine.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or invalid construction input, always fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unresolvable fragment or unusable page tree.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Directive or hook handler failure.
    #[error("directive error: {message}")]
    Directive {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Load, fetch, render or write failure.
    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: Cause,
    },
}

impl EngineError {
    /// Directive error without an underlying cause.
    pub fn directive(message: impl Into<String>) -> Self {
        Self::Directive {
            message: message.into(),
            source: None,
        }
    }

    /// Directive error wrapping a handler failure.
    pub fn directive_with(message: impl Into<String>, cause: anyhow::Error) -> Self {
        Self::Directive {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, cause: impl Into<Cause>) -> Self {
        Self::Io {
            path: path.into(),
            source: cause.into(),
        }
    }

    /// Short lowercase kind name, used as the log prefix.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config",
            Self::Resolution(_) => "resolve",
            Self::Directive { .. } => "directive",
            Self::Io { .. } => "io",
        }
    }

    /// Render the error and all of its causes on one line.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
