//! Error types for the gridq crate

use thiserror::Error;

/// Main error type for the gridq crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("environment failure: {message}")]
    Environment { message: String },

    #[error("invalid grid: {message}")]
    InvalidGrid { message: String },

    #[error("grid has no {marker} cell")]
    MissingMarker { marker: &'static str },

    #[error("no path from cell {source_cell} to cell {destination}")]
    Unreachable { source_cell: usize, destination: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unknown movement command '{0}'")]
    UnknownCommand(String),

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write diagnostics: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn environment(message: impl Into<String>) -> Self {
        Error::Environment {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type alias for gridq operations
pub type Result<T> = std::result::Result<T, Error>;
