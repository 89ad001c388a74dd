//! Error types for the playground pipeline
//!
//! Every failure is eventually shown to the user as an [`ErrorReport`], a title plus a
//! message. Each error type knows how to produce one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::playground::lexer::{LexErrorKind, Position};

/// The normalized shape every failure is reported in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub title: String,
    pub message: String,
}

impl ErrorReport {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// The tokenizer rejected the executable source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Line {}: {reason}", .position.line)]
pub struct TokenizeError {
    pub reason: LexErrorKind,
    pub position: Position,
}

impl TokenizeError {
    pub fn report(&self) -> ErrorReport {
        ErrorReport::new("SyntaxError", self.to_string())
    }
}

/// The transform step could not produce executable source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Source is {size} bytes, larger than the {limit} byte limit")]
    SourceTooLarge { size: usize, limit: usize },
}

impl TransformError {
    pub fn report(&self) -> ErrorReport {
        ErrorReport::new("TransformError", self.to_string())
    }
}

/// Running a piece of source failed
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The program threw; `name` is the exception's constructor name
    #[error("{name}: {message}")]
    Thrown { name: String, message: String },
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("executor exited with {status}: {stderr}")]
    Exited {
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("execution timed out after {limit_ms} ms")]
    TimedOut { limit_ms: u64 },
    #[error("executor I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("executor reply could not be decoded: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl ExecutionError {
    pub fn report(&self) -> ErrorReport {
        match self {
            ExecutionError::Thrown { name, message } => ErrorReport::new(name, message),
            other => ErrorReport::new("ExecutionError", other.to_string()),
        }
    }
}

/// Umbrella error for library and CLI entry points
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaygroundError {
    pub fn report(&self) -> ErrorReport {
        match self {
            PlaygroundError::Transform(err) => err.report(),
            PlaygroundError::Tokenize(err) => err.report(),
            PlaygroundError::Execution(err) => err.report(),
            PlaygroundError::Config(err) => ErrorReport::new("ConfigError", err.to_string()),
            PlaygroundError::Io(err) => ErrorReport::new("IOError", err.to_string()),
        }
    }
}
