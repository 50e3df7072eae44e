//! Error types for the math engine

use thiserror::Error;

/// Errors that can occur in math operations
#[derive(Error, Debug)]
pub enum MathError {
    /// Error parsing a LaTeX math fragment
    #[error("LaTeX parse error at {position}: {message}")]
    LatexParse { position: usize, message: String },

    /// A node has no representation in the requested export format
    #[error("cannot export {node} as {format}")]
    UnsupportedExport {
        node: &'static str,
        format: &'static str,
    },

    /// Geometry was requested before `metrics` ran, or after an edit
    #[error("stale layout: {0} used without a preceding metrics pass")]
    StaleLayout(&'static str),

    /// Invalid math structure (bad cell, row or column index)
    #[error("Invalid math structure: {0}")]
    InvalidStructure(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the output sink of a stream
    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// XML writer error during MathML output
    #[error("XML error: {0}")]
    Xml(String),
}

impl MathError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        MathError::LatexParse {
            position,
            message: message.into(),
        }
    }

    /// Whether this error is the typed "unsupported export" signal
    pub fn is_unsupported_export(&self) -> bool {
        matches!(self, MathError::UnsupportedExport { .. })
    }
}

/// Result type for math operations
pub type MathResult<T> = Result<T, MathError>;
