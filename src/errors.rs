/*!
 * Error types for the clozeport application.
 *
 * This module contains custom error types for the I/O side of the converter,
 * using the thiserror crate for ergonomic error definitions. The markup
 * rewriter itself never fails.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a flashcard package
#[derive(Error, Debug)]
pub enum PackageError {
    /// The archive could not be opened or read
    #[error("Failed to read package {path}: {message}")]
    Archive {
        /// Package path
        path: PathBuf,
        /// Underlying zip error
        message: String,
    },

    /// No data file was found in the package
    #[error("No data file found in {0}")]
    MissingDataFile(PathBuf),

    /// Several data files qualify and none has a preferred name
    #[error("Ambiguous data file in {path}: {candidates:?}")]
    AmbiguousDataFile {
        /// Package path
        path: PathBuf,
        /// Names of the competing entries
        candidates: Vec<String>,
    },

    /// A media entry could not be copied
    #[error("Failed to copy media entry {entry}: {message}")]
    MediaCopy {
        /// Entry name inside the package
        entry: String,
        /// Underlying error
        message: String,
    },
}

/// Errors that can occur while reading or writing delimited records
#[derive(Error, Debug)]
pub enum RecordError {
    /// A row could not be decoded
    #[error("Malformed record at line {line}: {message}")]
    Malformed {
        /// 1-based line number, 0 when unknown
        line: u64,
        /// Decoder message
        message: String,
    },

    /// A row could not be written
    #[error("Failed to write record: {0}")]
    Write(String),
}

impl From<csv::Error> for RecordError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|p| p.line()).unwrap_or(0);
        Self::Malformed {
            line,
            message: error.to_string(),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from package handling
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Error from record decoding or encoding
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
