//! Error types for the FitnessGram to PFAI conversion pipeline.
//!
//! - [`ParseError`] - decoding and tabular parsing of input files
//! - [`SourceError`] - building student records from the export
//! - [`OverrideError`] - reading the override (merge) file
//! - [`ExportError`] - writing the PFAI report
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Conversion is via `From`, so `?` works across stage boundaries.
//! Field-level problems are not errors: they become [`crate::warnings::Warning`]s.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Parsing Errors
// =============================================================================

/// Errors while decoding or splitting a tabular input file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read file.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded with the requested encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Malformed CSV.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("File is empty")]
    EmptyFile,

    /// A required column is absent from the header row.
    #[error("Missing column: {column}")]
    MissingColumn { column: String },
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while turning export rows into student records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// None of the student's rows carries a test event end date.
    #[error("Student ({student}): no TestEventEndDate in any row")]
    MissingTestDate { student: String },

    /// A test event end date is present but is not a MM/DD/YYYY date.
    #[error("Student ({student}): invalid TestEventEndDate \"{value}\"")]
    InvalidTestDate { student: String, value: String },
}

// =============================================================================
// Override Errors
// =============================================================================

/// Errors while reading override data.
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing the PFAI report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Csv(err.into())
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Each variant corresponds to one fatal I/O class; the display prefix is the
/// diagnostic shown before the process exits.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unable to open Fitnessgram Data Export: {0}")]
    Source(#[from] SourceError),

    #[error("Unable to open merge data: {0}")]
    Override(#[from] OverrideError),

    #[error("Unable to write output csv: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for source reading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for override reading.
pub type OverrideResult<T> = Result<T, OverrideError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
