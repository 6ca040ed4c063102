//! FitnessGram export reader.
//!
//! Reads the "FitnessGram Data Export" (UTF-16LE by default), folds each
//! student's partial test sessions into one row, derives the computed PFAI
//! fields and translates the result through [`FIELD_MAP`].
//!
//! ```text
//! rows ──group by StudentID──▶ MergedRow ──derive──▶ translate ──▶ StudentRecord
//! ```

pub mod derive;

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::SourceResult;
use crate::models::{MergedRow, RawRecord, StudentRecord, StudentTable};
use crate::parser::{parse_file, HeaderStyle, ParsedTable};
use crate::schema::{derived, required_source_columns, source, Field, FIELD_MAP};
use crate::warnings::{Warning, Warnings};

pub use derive::Derived;

/// Encoding of a FitnessGram export when none is configured.
pub const DEFAULT_SOURCE_ENCODING: &str = "utf-16le";

/// Students read from an export.
#[derive(Debug, Clone)]
pub struct SourceData {
    pub students: StudentTable,
    /// Number of data rows in the export before merging.
    pub raw_rows: usize,
    /// Encoding the export was decoded with.
    pub encoding: String,
}

/// Read and merge a FitnessGram export.
pub fn read_source<P: AsRef<Path>>(
    path: P,
    encoding: &str,
    warnings: &mut Warnings,
) -> SourceResult<SourceData> {
    let table = parse_file(path.as_ref(), encoding, HeaderStyle::StripWhitespace)?;
    let students = build_students(&table, warnings)?;

    info!(
        rows = table.records.len(),
        students = students.len(),
        encoding = %table.encoding,
        "read FitnessGram export"
    );

    Ok(SourceData {
        students,
        raw_rows: table.records.len(),
        encoding: table.encoding,
    })
}

/// Build one [`StudentRecord`] per distinct `StudentID`, in first-seen order.
pub fn build_students(table: &ParsedTable, warnings: &mut Warnings) -> SourceResult<StudentTable> {
    table.require_columns(&required_source_columns())?;

    let mut students = StudentTable::new();
    for (id, rows) in group_rows(&table.records) {
        students.insert(build_student(id, &rows, warnings)?);
    }
    Ok(students)
}

/// Group rows by student identifier, preserving first-seen order of students
/// and file order of rows within a student.
pub fn group_rows(records: &[RawRecord]) -> Vec<(&str, Vec<&RawRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&RawRecord>)> = Vec::new();

    for record in records {
        let id = record.get(source::STUDENT_ID);
        match index.get(id) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(id, groups.len());
                groups.push((id, vec![record]));
            }
        }
    }
    groups
}

/// Merge one student's rows and derive their PFAI record.
pub fn build_student(
    id: &str,
    rows: &[&RawRecord],
    warnings: &mut Warnings,
) -> SourceResult<StudentRecord> {
    let mut merged: MergedRow = rows.iter().copied().collect();

    let mut apply = |merged: &mut MergedRow, column: &str, derived: Derived| {
        let (value, warning) = derived.into_parts();
        if let Some(message) = warning {
            warnings.push(Warning::new(id, message));
        }
        merged.set(column, value);
    };

    let school = derive::school_id(merged.get(source::SCHOOL_ID));
    apply(&mut merged, source::SCHOOL_ID, school);

    let dob = derive::birth_date(merged.get(source::STUDENT_DOB));
    apply(&mut merged, source::STUDENT_DOB, dob);

    let test_date = derive::test_date(id, rows.iter().copied(), source::TEST_EVENT_END_DATE)?;
    merged.set(derived::TEST_DATE, test_date);

    let height = derive::height(
        merged.get(source::HEIGHT_FEET),
        merged.get(source::HEIGHT_INCHES),
    );
    apply(&mut merged, derived::HEIGHT, height);

    let weight = derive::weight(merged.get(source::WEIGHT));
    apply(&mut merged, source::WEIGHT, weight);

    let laps = derive::pacer_laps(merged.get(source::PACER_15), merged.get(source::PACER_20));
    merged.set(derived::PACER_LAPS, laps);

    let hispanic = derive::hispanic_latino_flag(merged.get(source::ETHNICITY));
    merged.set(Field::IsHispanicLatino.header(), hispanic);
    for (field, value) in derive::race_flags(merged.get(source::RACE)) {
        merged.set(field.header(), value);
    }

    let mut record = translate(id, &merged, &FIELD_MAP);
    record.exemptions = derive::exemptions(&merged);

    debug!(
        student = id,
        rows = rows.len(),
        exemptions = record.exemptions.len(),
        "built student record"
    );

    Ok(record)
}

/// Project a merged row onto destination fields; unmapped columns are dropped.
pub fn translate(id: &str, merged: &MergedRow, map: &[(Field, &str)]) -> StudentRecord {
    let mut record = StudentRecord::new(id);
    for (field, column) in map {
        record.set(*field, merged.get(column));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_table;

    const HEADER: &str = "Student ID,School ID,School Name,Student DOB,Grade,Gender,\
Test Event End Date,Height FT,Height IN,Weight,Triceps Skinfold,Calf Skinfold,\
One Mile Run Min,One Mile Run Sec,PACER 15 laps,PACER 20 laps,Walk Test Minutes,\
Walk Test Seconds,Walk Test Heart Rate,Curlup,Trunk Lift,Pushup,Modified Pullup,\
Flexed Arm Hang,Sitand Reach L,Sitand Reach R,Shoulder Stretch L,Shoulder Stretch R,\
Ethnicity,Race,Aerobic Capacity HFZ";

    fn table(rows: &[&str]) -> ParsedTable {
        let mut csv = HEADER.to_string();
        for r in rows {
            csv.push('\n');
            csv.push_str(r);
        }
        parse_table(&csv, HeaderStyle::StripWhitespace).unwrap()
    }

    #[test]
    fn test_single_row_derivations() {
        let t = table(&["1001,001-123456789,Lincoln,01/02/2010 00:00,5,F,05/01/2024 09:00,\
4,6.5,80.9,,,,,,42,,,,20,9,15,,,10,10,,,Hispanic or Latino,Asian,"]);
        let mut warnings = Warnings::new(true);
        let students = build_students(&t, &mut warnings).unwrap();

        let rec = students.get("1001").unwrap();
        assert_eq!(rec.get(Field::SchoolId), "123456789");
        assert_eq!(rec.get(Field::StudentDob), "01/02/2010");
        assert_eq!(rec.get(Field::TestDate), "05/01/2024");
        assert_eq!(rec.get(Field::Height), "54");
        assert_eq!(rec.get(Field::Weight), "80");
        assert_eq!(rec.get(Field::PacerLaps), "42");
        assert_eq!(rec.get(Field::IsHispanicLatino), "1");
        assert_eq!(rec.get(Field::IsAsian), "1");
        assert_eq!(rec.get(Field::IsWhite), "0");
        assert_eq!(rec.get(Field::IsAmericanIndianAlaskaNative), "0");
        assert_eq!(rec.get(Field::IsBlackAfricanAmerican), "0");
        assert_eq!(rec.get(Field::IsNativeHawaiianOtherPacificIslander), "0");
        assert_eq!(rec.get(Field::CurlUp), "20");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_rows_merge_fill_only() {
        let t = table(&[
            "7,001-111111111,A,01/01/2011,4,M,03/01/2024,,,,,,,,,,,,,25,,,,,,,,,,White,",
            "7,001-222222222,B,01/01/2011,4,M,04/01/2024,4,10,70,,,,,,30,,,,50,8,,,,,,,,,White,11",
        ]);
        let mut warnings = Warnings::disabled();
        let students = build_students(&t, &mut warnings).unwrap();
        assert_eq!(students.len(), 1);

        let rec = students.get("7").unwrap();
        assert_eq!(rec.get(Field::SchoolId), "111111111");
        assert_eq!(rec.get(Field::SchoolName), "A");
        assert_eq!(rec.get(Field::CurlUp), "25");
        assert_eq!(rec.get(Field::TrunkLift), "8");
        assert_eq!(rec.get(Field::Height), "58");
        assert_eq!(rec.get(Field::Weight), "70");
        assert_eq!(rec.get(Field::PacerLaps), "30");
        assert_eq!(rec.get(Field::TestDate), "04/01/2024");
        assert!(rec.exemptions.contains("AerobicCapacityHFZ"));
    }

    #[test]
    fn test_bad_school_code_warns_and_keeps_raw() {
        let t = table(&["3,XYZ,A,bad,4,M,03/01/2024,,,,,,,,,,,,,,,,,,,,,,,,"]);
        let mut warnings = Warnings::new(true);
        let students = build_students(&t, &mut warnings).unwrap();

        let rec = students.get("3").unwrap();
        assert_eq!(rec.get(Field::SchoolId), "XYZ");
        assert_eq!(rec.get(Field::StudentDob), "bad");
        assert_eq!(rec.get(Field::Height), "");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.student == "3"));
    }

    #[test]
    fn test_export_without_height_columns() {
        let header = HEADER.replace("Height FT,Height IN,", "");
        let csv = format!(
            "{}\n1001,001-123456789,Lincoln,01/02/2010,5,F,05/01/2024,80,,,,,,42,,,,20,9,15,,,10,10,,,,,",
            header
        );
        let t = parse_table(&csv, HeaderStyle::StripWhitespace).unwrap();
        let mut warnings = Warnings::new(true);
        let students = build_students(&t, &mut warnings).unwrap();

        let rec = students.get("1001").unwrap();
        assert_eq!(rec.get(Field::Height), "");
        assert_eq!(rec.get(Field::Weight), "80");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_test_date_fails() {
        let t = table(&["3,001-123456789,A,01/01/2011,4,M,,,,,,,,,,,,,,,,,,,,,,,,,"]);
        let result = build_students(&t, &mut Warnings::disabled());
        assert!(matches!(
            result,
            Err(crate::error::SourceError::MissingTestDate { .. })
        ));
    }

    #[test]
    fn test_missing_column_fails() {
        let t = parse_table("StudentID,Grade\n1,5", HeaderStyle::StripWhitespace).unwrap();
        let result = build_students(&t, &mut Warnings::disabled());
        assert!(matches!(result, Err(crate::error::SourceError::Parse(_))));
    }

    #[test]
    fn test_group_rows_order() {
        let rows: Vec<RawRecord> = ["b", "a", "b"]
            .into_iter()
            .map(|id| [("StudentID", id)].into_iter().collect())
            .collect();
        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a");
    }

    #[test]
    fn test_translate_single_row_is_direct() {
        let row: RawRecord = [("SchoolName", "Lincoln"), ("Pushup", "12"), ("Extra", "x")]
            .into_iter()
            .collect();
        let merged: MergedRow = [&row].into_iter().collect();
        let rec = translate("1", &merged, &FIELD_MAP);
        assert_eq!(rec.get(Field::SchoolName), "Lincoln");
        assert_eq!(rec.get(Field::PushUp), "12");
        assert_eq!(rec.get(Field::Weight), "");
    }
}
