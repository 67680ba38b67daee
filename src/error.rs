//! Error types for the engine and the report builder.

use std::path::PathBuf;

use thiserror::Error;

/// An input field outside its allowed domain.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid input: {field} {message}")]
pub struct ValidationError {
    /// Name of the offending input field.
    pub field: &'static str,
    /// Constraint that was violated.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("cannot write report \"{}\": {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
