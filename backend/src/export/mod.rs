//! PFAI report writer.
//!
//! Writes the fixed PFAI header followed by one row per student, in the order
//! students were first seen in the export.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{ExportError, ExportResult};
use crate::models::StudentTable;
use crate::schema::Field;

/// PFAI column headers in output order.
pub fn output_headers() -> Vec<&'static str> {
    Field::all().map(Field::header).collect()
}

/// Write the report to any writer; returns the number of data rows.
pub fn write_report<W: Write>(writer: W, students: &StudentTable) -> ExportResult<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(output_headers())?;
    for student in students.iter() {
        csv.write_record(student.values())?;
    }
    csv.flush()?;
    Ok(students.len())
}

/// Create (or truncate) `path` and write the report into it.
pub fn export<P: AsRef<Path>>(path: P, students: &StudentTable) -> ExportResult<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = write_report(file, students)?;
    info!(path = %path.display(), rows, "wrote PFAI report");
    Ok(rows)
}
