//! Encoding-aware tabular text parsing.
//!
//! Turns raw file bytes into [`RawRecord`]s keyed by header name. Nothing
//! FitnessGram-specific lives here beyond the header normalisation switch.

use encoding_rs::Encoding;
use std::path::Path;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::models::RawRecord;

/// Encoding label that asks for BOM / statistical detection.
pub const AUTO_ENCODING: &str = "auto";

/// How header cells are turned into column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Use header text verbatim.
    Verbatim,
    /// Remove every whitespace character (`"Student ID"` -> `"StudentID"`).
    StripWhitespace,
}

impl HeaderStyle {
    fn apply(self, header: &str) -> String {
        match self {
            HeaderStyle::Verbatim => header.to_string(),
            HeaderStyle::StripWhitespace => {
                header.chars().filter(|c| !c.is_whitespace()).collect()
            }
        }
    }
}

/// Parsed file with metadata
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Normalised column headers
    pub headers: Vec<String>,
    /// One record per data row
    pub records: Vec<RawRecord>,
    /// Encoding actually used to decode the file
    pub encoding: String,
}

impl ParsedTable {
    /// Fail with [`ParseError::MissingColumn`] for the first absent column.
    pub fn require_columns(&self, columns: &[&str]) -> ParseResult<()> {
        match columns.iter().find(|c| !self.headers.iter().any(|h| h == *c)) {
            Some(missing) => Err(ParseError::MissingColumn {
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Detect the encoding of raw bytes: BOM first, then chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding.name().to_lowercase();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "utf-16le" => "utf-16le".to_string(),
        "utf-16be" => "utf-16be".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the given encoding label.
///
/// A leading BOM overrides the label and is never part of the output.
/// Malformed sequences are an error rather than being replaced.
pub fn decode_content(bytes: &[u8], label: &str) -> ParseResult<(String, String)> {
    let label = if label.eq_ignore_ascii_case(AUTO_ENCODING) {
        detect_encoding(bytes)
    } else {
        label.to_string()
    };

    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| ParseError::Encoding(format!("unknown encoding '{}'", label)))?;

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ParseError::Encoding(format!(
            "content is not valid {}",
            used.name()
        )));
    }

    Ok((text.into_owned(), used.name().to_lowercase()))
}

/// Parse decoded text into a [`ParsedTable`].
///
/// Rows may be shorter or longer than the header; blank lines are skipped.
pub fn parse_table(content: &str, style: HeaderStyle) -> ParseResult<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| style.apply(h))
        .collect();

    if headers.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(RawRecord::from_cells(&headers, row.iter()));
    }

    Ok(ParsedTable {
        headers,
        records,
        encoding: String::new(),
    })
}

/// Read a file and parse it with the given encoding label.
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    encoding: &str,
    style: HeaderStyle,
) -> ParseResult<ParsedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let (content, used) = decode_content(&bytes, encoding)?;
    let mut table = parse_table(&content, style)?;
    table.encoding = used;

    debug!(
        path = %path.display(),
        encoding = %table.encoding,
        columns = table.headers.len(),
        rows = table.records.len(),
        "parsed table"
    );

    Ok(table)
}
