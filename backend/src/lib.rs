//! # PFAI - FitnessGram export to PFAI report conversion
//!
//! Converts a "FitnessGram Data Export" (one row per test session, several
//! rows per student) into the fixed-column PFAI report, optionally layering
//! manual corrections from an override file on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │  FG export   │──▶│    source    │──▶│ overrides  │──▶│ validation │──▶│   export   │
//! │  (UTF-16LE)  │   │ merge+derive │   │ (optional) │   │ warn+clear │   │ PFAI .csv  │
//! └──────────────┘   └──────────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pfai::{convert, ConvertOptions};
//!
//! let summary = convert(&ConvertOptions::new("export.csv", "pfai.csv"))?;
//! println!("Wrote {} students", summary.students);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`schema`] - PFAI fields and the export column mapping
//! - [`models`] - Raw rows, merge accumulator, student records
//! - [`parser`] - Encoding-aware CSV parsing
//! - [`source`] - Export reader and field derivations
//! - [`overrides`] - Override file reader and merger
//! - [`validation`] - Field checks and exclusive test groups
//! - [`warnings`] - Advisory warning sink
//! - [`export`] - PFAI report writer
//! - [`pipeline`] - End-to-end conversion
//! - [`logging`] - tracing setup

// Core modules
pub mod error;
pub mod models;
pub mod schema;
pub mod warnings;

// Reading
pub mod overrides;
pub mod parser;
pub mod source;

// Checking and writing
pub mod export;
pub mod validation;

// Orchestration
pub mod logging;
pub mod pipeline;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ExportError, OverrideError, ParseError, PipelineError, PipelineResult, SourceError,
};

// =============================================================================
// Re-exports - Models and schema
// =============================================================================

pub use models::{MergedRow, OverrideRecord, RawRecord, StudentRecord, StudentTable};
pub use schema::{Field, FIELD_MAP};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use export::{export, output_headers, write_report};
pub use overrides::{merge_overrides, read_overrides, MergeStats, OverrideMap};
pub use source::{read_source, SourceData};
pub use validation::{validate_student, validate_students};
pub use warnings::{Warning, Warnings};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{convert, ConvertOptions, PipelineSummary};
