//! Error types for propbind-source

use std::path::PathBuf;

/// Result type for propbind-source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading property sources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} properties at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported property file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid property line {line} in {origin}: {content}")]
    InvalidLine {
        origin: String,
        line: usize,
        content: String,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            format: format.into(),
            message: message.into(),
        }
    }
}
