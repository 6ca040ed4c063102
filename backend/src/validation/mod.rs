//! PFAI field validation.
//!
//! Runs after overrides are merged. Scalar checks only warn; exclusive group
//! resolution (see [`groups`]) also clears the losing sub-forms. Every check
//! runs for every student, so one bad field never hides another.
//!
//! # Checks
//!
//! | Field | Constraint |
//! |---|---|
//! | School ID | 9 digits |
//! | School Name | at most 75 characters |
//! | Test Date, Student DOB | `MM/DD/YYYY` calendar date |
//! | Student Grade | 3-12, optional leading zero |
//! | Student Gender | `M` or `F`, any case |
//! | Curl Up | 0-75 unless exempt |
//! | Trunk Lift | 0-12 unless exempt |
//! | race/ethnicity flags | blank, `0` or `1` |

pub mod groups;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{StudentRecord, StudentTable};
use crate::schema::{Field, ETHNICITY_FLAGS};
use crate::source::derive::parse_date;
use crate::warnings::{Warning, Warnings};

pub use groups::{ExclusiveGroup, Resolution, SubForm, EXCLUSIVE_GROUPS};

/// Maximum length of a school name.
pub const MAX_SCHOOL_NAME_LEN: usize = 75;

/// Curl Up and Trunk Lift are checked after this many groups (body
/// composition and aerobic capacity), ahead of strength and flexibility.
const STANDALONE_AFTER: usize = 2;

static SCHOOL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9}$").expect("valid regex"));
static GRADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0?[3-9]|1[0-2])$").expect("valid regex"));
static GENDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[mMfF]$").expect("valid regex"));
static CURL_UP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d|[1-6]\d|7[0-5])$").expect("valid regex"));
static TRUNK_LIFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d|1[0-2])$").expect("valid regex"));
static FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-1]?$").expect("valid regex"));

/// Validate every student, clearing losing sub-forms and collecting warnings.
pub fn validate_students(students: &mut StudentTable, warnings: &mut Warnings) {
    for record in students.iter_mut() {
        validate_student(record, warnings);
    }
    debug!(students = students.len(), warnings = warnings.len(), "validated students");
}

/// Validate a single student.
pub fn validate_student(record: &mut StudentRecord, warnings: &mut Warnings) {
    check_scalars(record, warnings);

    let (leading, trailing) = EXCLUSIVE_GROUPS.split_at(STANDALONE_AFTER);
    resolve_groups(leading, record, warnings);
    check_standalone_tests(record, warnings);
    resolve_groups(trailing, record, warnings);

    check_ethnicity_flags(record, warnings);
}

fn resolve_groups(groups: &[ExclusiveGroup], record: &mut StudentRecord, warnings: &mut Warnings) {
    for group in groups {
        if group.resolve(record) == Resolution::Missing {
            warnings.push(Warning::new(
                &record.id,
                format!("Invalid {} Test: {}", group.name, group.requirement),
            ));
        }
    }
}

fn check_scalars(record: &StudentRecord, warnings: &mut Warnings) {
    let id = record.id.as_str();

    let school_id = record.get(Field::SchoolId);
    if !SCHOOL_ID.is_match(school_id) {
        warnings.push(Warning::invalid(id, Field::SchoolId, school_id, Some("Should be 9-digit code")));
    }

    let school_name = record.get(Field::SchoolName);
    if school_name.chars().count() > MAX_SCHOOL_NAME_LEN {
        warnings.push(Warning::invalid(
            id,
            Field::SchoolName,
            school_name,
            Some("Max length is 75 characters"),
        ));
    }

    for field in [Field::TestDate, Field::StudentDob] {
        let value = record.get(field);
        if parse_date(value).is_none() {
            warnings.push(Warning::invalid(id, field, value, None));
        }
    }

    let grade = record.get(Field::StudentGrade);
    if !GRADE.is_match(grade) {
        warnings.push(Warning::invalid(id, Field::StudentGrade, grade, Some("Should be in range 3-12")));
    }

    let gender = record.get(Field::StudentGender);
    if !GENDER.is_match(gender) {
        warnings.push(Warning::invalid(
            id,
            Field::StudentGender,
            gender,
            Some("Should be \"M\" or \"F\""),
        ));
    }
}

fn check_standalone_tests(record: &StudentRecord, warnings: &mut Warnings) {
    let tests: [(Field, &Regex, &str, &str); 2] = [
        (Field::CurlUp, &*CURL_UP, "CurlupHFZ", "Should be in range 0-75"),
        (Field::TrunkLift, &*TRUNK_LIFT, "TrunkLiftHFZ", "Should be in range 0-12"),
    ];

    for (field, pattern, marker, expected) in tests {
        let value = record.get(field);
        if !pattern.is_match(value) && !record.is_exempt_from(&[marker]) {
            warnings.push(Warning::invalid(&record.id, field, value, Some(expected)));
        }
    }
}

fn check_ethnicity_flags(record: &StudentRecord, warnings: &mut Warnings) {
    for field in ETHNICITY_FLAGS {
        let value = record.get(field);
        if !FLAG.is_match(value) {
            warnings.push(Warning::new(
                &record.id,
                format!("Invalid {} ({}): Must be blank, 0, or 1", field, value),
            ));
        }
    }
}
