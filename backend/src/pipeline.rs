//! High-level conversion API.
//!
//! Runs every stage in order: read the export, overlay overrides, validate,
//! write the report. Each input file is fully read and closed before the next
//! stage starts.
//!
//! # Example
//!
//! ```rust,ignore
//! use pfai::pipeline::{convert, ConvertOptions};
//!
//! let options = ConvertOptions::new("export.csv", "pfai.csv").with_warnings(true);
//! let summary = convert(&options)?;
//! for warning in &summary.warnings {
//!     println!("{}", warning);
//! }
//! ```
//!
//! With [`ConvertOptions::with_echo`] warnings are also printed to stdout as
//! each stage raises them, before any later stage can fail.

use std::path::PathBuf;
use tracing::info;

use crate::error::PipelineResult;
use crate::export::export;
use crate::overrides::{merge_overrides, read_overrides, MergeStats};
use crate::source::{read_source, DEFAULT_SOURCE_ENCODING};
use crate::validation::validate_students;
use crate::warnings::{Warning, Warnings};

/// Options for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// FitnessGram data export
    pub input: PathBuf,
    /// PFAI report to write
    pub output: PathBuf,
    /// Optional override file
    pub merge: Option<PathBuf>,
    /// Collect validation warnings
    pub warn: bool,
    /// Print warnings to stdout as they are raised
    pub echo_warnings: bool,
    /// Encoding label of the export (`auto` to detect)
    pub source_encoding: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new(PathBuf::new(), PathBuf::new())
    }
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            merge: None,
            warn: false,
            echo_warnings: false,
            source_encoding: DEFAULT_SOURCE_ENCODING.to_string(),
        }
    }

    pub fn with_merge(mut self, merge: impl Into<PathBuf>) -> Self {
        self.merge = Some(merge.into());
        self
    }

    pub fn with_warnings(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_warnings = echo;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.source_encoding = encoding.into();
        self
    }
}

/// What a conversion run did
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Data rows in the export
    pub raw_rows: usize,
    /// Students written to the report
    pub students: usize,
    /// Override merge counters (all zero without a merge file)
    pub overrides: MergeStats,
    /// Warnings raised, empty when warnings are disabled
    pub warnings: Vec<Warning>,
}

/// Run the full conversion.
pub fn convert(options: &ConvertOptions) -> PipelineResult<PipelineSummary> {
    let mut warnings = Warnings::new(options.warn).with_echo(options.echo_warnings);

    let source = read_source(&options.input, &options.source_encoding, &mut warnings)?;
    let mut students = source.students;

    let overrides = match &options.merge {
        Some(path) => {
            let data = read_overrides(path)?;
            merge_overrides(&mut students, &data)
        }
        None => MergeStats::default(),
    };

    validate_students(&mut students, &mut warnings);

    let written = export(&options.output, &students)?;

    info!(
        rows = source.raw_rows,
        students = written,
        warnings = warnings.len(),
        "conversion complete"
    );

    Ok(PipelineSummary {
        raw_rows: source.raw_rows,
        students: written,
        overrides,
        warnings: warnings.into_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.source_encoding, DEFAULT_SOURCE_ENCODING);
        assert!(options.merge.is_none());
        assert!(!options.warn);
        assert!(!options.echo_warnings);
    }
}
