/*!
 * Tests for error types
 */

use std::io;
use std::path::PathBuf;

use clozeport::errors::{AppError, PackageError, RecordError};

/// Test package error messages
#[test]
fn test_packageError_display_shouldNameThePackage() {
    let missing = PackageError::MissingDataFile(PathBuf::from("decks/a.zip"));
    let ambiguous = PackageError::AmbiguousDataFile {
        path: PathBuf::from("b.zip"),
        candidates: vec!["x.csv".to_string(), "y.tsv".to_string()],
    };
    
    assert_eq!(missing.to_string(), "No data file found in decks/a.zip");
    assert!(ambiguous.to_string().starts_with("Ambiguous data file in b.zip"));
    assert!(ambiguous.to_string().contains("y.tsv"));
}

/// Test wrapping into the application error
#[test]
fn test_appError_from_shouldWrapWithCategory() {
    let package: AppError = PackageError::MissingDataFile(PathBuf::from("a.zip")).into();
    let record: AppError = RecordError::Write("disk full".to_string()).into();
    let file: AppError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    let other: AppError = anyhow::anyhow!("boom").into();
    
    assert!(package.to_string().starts_with("Package error: No data file found"));
    assert_eq!(record.to_string(), "Record error: Failed to write record: disk full");
    assert_eq!(file.to_string(), "File error: gone");
    assert_eq!(other.to_string(), "Unknown error: boom");
}

/// Test the record error message shape
#[test]
fn test_recordError_malformed_shouldReportLine() {
    let err = RecordError::Malformed { line: 7, message: "bad quote".to_string() };
    
    assert_eq!(err.to_string(), "Malformed record at line 7: bad quote");
}
