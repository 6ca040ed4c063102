//! Override (merge) file: manual corrections layered over the export.
//!
//! The file is a UTF-8 CSV keyed by a `Student ID` column; every other column
//! whose header is exactly a PFAI field name replaces that field for the
//! matching student. Empty override cells never erase existing data.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::OverrideResult;
use crate::models::{OverrideRecord, StudentTable};
use crate::parser::{parse_file, HeaderStyle, ParsedTable};
use crate::schema::{Field, OVERRIDE_ID_COLUMN};

/// Encoding of the override file.
pub const OVERRIDE_ENCODING: &str = "utf-8";

/// Override records keyed by student identifier.
pub type OverrideMap = HashMap<String, OverrideRecord>;

/// Counters describing one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Students that had at least one field replaced.
    pub students: usize,
    /// Individual field replacements.
    pub fields: usize,
    /// Override rows with no matching student.
    pub unmatched: usize,
}

/// Read an override file.
pub fn read_overrides<P: AsRef<Path>>(path: P) -> OverrideResult<OverrideMap> {
    let table = parse_file(path.as_ref(), OVERRIDE_ENCODING, HeaderStyle::Verbatim)?;
    let overrides = overrides_from_table(&table)?;
    info!(rows = overrides.len(), "read override data");
    Ok(overrides)
}

/// Key override rows by `Student ID`; a repeated id keeps the last row.
pub fn overrides_from_table(table: &ParsedTable) -> OverrideResult<OverrideMap> {
    table.require_columns(&[OVERRIDE_ID_COLUMN])?;

    let overrides: OverrideMap = table
        .records
        .iter()
        .map(|row| {
            let fields = table
                .headers
                .iter()
                .map(|h| (h.clone(), row.get(h).to_string()))
                .collect();
            let id = row.get(OVERRIDE_ID_COLUMN).to_string();
            (id.clone(), OverrideRecord { id, fields })
        })
        .collect();

    Ok(overrides)
}

/// Overlay non-empty override values onto matching students.
///
/// Ids with no matching student and columns that are not PFAI fields are
/// ignored.
pub fn merge_overrides(students: &mut StudentTable, overrides: &OverrideMap) -> MergeStats {
    let mut stats = MergeStats::default();

    for (id, data) in overrides {
        let Some(student) = students.get_mut(id) else {
            stats.unmatched += 1;
            debug!(student = %id, "override has no matching student");
            continue;
        };

        let mut replaced = 0;
        for (column, value) in &data.fields {
            if value.is_empty() {
                continue;
            }
            if let Some(field) = Field::from_header(column) {
                student.set(field, value.as_str());
                replaced += 1;
            }
        }

        if replaced > 0 {
            stats.students += 1;
            stats.fields += replaced;
        }
    }

    info!(
        students = stats.students,
        fields = stats.fields,
        unmatched = stats.unmatched,
        "applied overrides"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;
    use crate::parser::parse_table;

    fn students() -> StudentTable {
        let mut a = StudentRecord::new("1");
        a.set(Field::PushUp, "10");
        a.set(Field::Weight, "80");
        let b = StudentRecord::new("2");
        [a, b].into_iter().collect()
    }

    fn overrides(csv: &str) -> OverrideMap {
        let table = parse_table(csv, HeaderStyle::Verbatim).unwrap();
        overrides_from_table(&table).unwrap()
    }

    #[test]
    fn test_non_empty_override_replaces() {
        let mut table = students();
        let stats = merge_overrides(&mut table, &overrides("Student ID,Push Up\n1,25"));

        assert_eq!(table.get("1").unwrap().get(Field::PushUp), "25");
        assert_eq!(stats.students, 1);
        assert_eq!(stats.fields, 1);
    }

    #[test]
    fn test_empty_override_never_erases() {
        let mut table = students();
        merge_overrides(&mut table, &overrides("Student ID,Push Up,Weight\n1,,"));

        let rec = table.get("1").unwrap();
        assert_eq!(rec.get(Field::PushUp), "10");
        assert_eq!(rec.get(Field::Weight), "80");
    }

    #[test]
    fn test_unmatched_and_unknown_ignored() {
        let mut table = students();
        let before = table.get("2").cloned();
        let stats = merge_overrides(
            &mut table,
            &overrides("Student ID,Pushup,Curl Up\n99,5,5\n2,7,"),
        );

        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.students, 0);
        assert_eq!(table.get("2").cloned(), before);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_id_column() {
        let table = parse_table("StudentID,Push Up\n1,2", HeaderStyle::Verbatim).unwrap();
        assert!(overrides_from_table(&table).is_err());
    }
}
