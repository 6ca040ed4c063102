//! Per-field derivations applied to a merged export row.
//!
//! Each derivation is its own function so that one bad field only ever
//! suppresses that field. Fallible ones return [`Derived`]: either the new
//! value, or the value to fall back to plus an optional warning message.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::error::{SourceError, SourceResult};
use crate::models::{MergedRow, RawRecord};
use crate::schema::{Field, EXEMPT_VALUE, HISPANIC_LATINO, RACE_FLAGS, ZONE_MARKER};

/// Canonical PFAI date format.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Outcome of a fallible field derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derived {
    /// Derivation succeeded.
    Value(String),
    /// Derivation failed; use `value` and report `warning` if there is one.
    Fallback {
        value: String,
        warning: Option<String>,
    },
}

impl Derived {
    fn silent(value: impl Into<String>) -> Self {
        Derived::Fallback {
            value: value.into(),
            warning: None,
        }
    }

    fn warned(value: impl Into<String>, warning: String) -> Self {
        Derived::Fallback {
            value: value.into(),
            warning: Some(warning),
        }
    }

    /// Split into the value to store and the warning to raise, if any.
    pub fn into_parts(self) -> (String, Option<String>) {
        match self {
            Derived::Value(v) => (v, None),
            Derived::Fallback { value, warning } => (value, warning),
        }
    }
}

/// Parse `MM/DD/YYYY`, ignoring anything after the first space.
pub fn parse_date_portion(raw: &str) -> Option<NaiveDate> {
    let date = raw.split(' ').next().unwrap_or("");
    parse_date(date)
}

/// Parse a strict `MM/DD/YYYY` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// School code `DDD-NNNNNNNNN` to the 9-digit school id.
pub fn school_id(raw: &str) -> Derived {
    match raw.split('-').nth(1) {
        Some(id) => Derived::Value(id.to_string()),
        None => Derived::warned(
            raw,
            format!("Unable to parse SchoolID \"{}\" to 9-digit code", raw),
        ),
    }
}

/// Birth date with any time suffix dropped, reformatted canonically.
pub fn birth_date(raw: &str) -> Derived {
    match parse_date_portion(raw) {
        Some(date) => Derived::Value(format_date(date)),
        None => Derived::warned(
            raw,
            format!("Unable to parse StudentDOB \"{}\" to valid date", raw),
        ),
    }
}

/// Latest test event end date across all of a student's rows.
///
/// Empty dates are skipped; a student with none at all is an error.
pub fn test_date<'a>(
    student: &str,
    rows: impl IntoIterator<Item = &'a RawRecord>,
    column: &str,
) -> SourceResult<String> {
    let mut latest: Option<NaiveDate> = None;
    for row in rows {
        let raw = row.get(column);
        if raw.is_empty() {
            continue;
        }
        let date = parse_date_portion(raw).ok_or_else(|| SourceError::InvalidTestDate {
            student: student.to_string(),
            value: raw.to_string(),
        })?;
        latest = latest.max(Some(date));
    }

    latest
        .map(format_date)
        .ok_or_else(|| SourceError::MissingTestDate {
            student: student.to_string(),
        })
}

/// Total height in whole inches from feet and (possibly fractional) inches.
///
/// Any parse failure yields an empty height without a warning; validation
/// reports the missing body composition later.
pub fn height(feet: &str, inches: &str) -> Derived {
    let total = feet.trim().parse::<i64>().ok().and_then(|ft| {
        let inches = truncate(inches)?;
        ft.checked_mul(12)?.checked_add(inches)
    });

    match total {
        Some(total) => Derived::Value(total.to_string()),
        None => Derived::silent(""),
    }
}

/// Weight rounded down to whole pounds; unparseable weights are kept as-is.
pub fn weight(raw: &str) -> Derived {
    match truncate(raw) {
        Some(lbs) => Derived::Value(lbs.to_string()),
        None => Derived::silent(raw),
    }
}

fn truncate(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// PACER laps: 15m protocol if recorded, otherwise 20m.
pub fn pacer_laps(pacer15: &str, pacer20: &str) -> String {
    let laps = if pacer15.is_empty() { pacer20 } else { pacer15 };
    laps.to_string()
}

fn flag(set: bool) -> &'static str {
    if set {
        "1"
    } else {
        "0"
    }
}

/// `IsHispanicLatino` flag from the ethnicity column.
pub fn hispanic_latino_flag(ethnicity: &str) -> &'static str {
    flag(ethnicity == HISPANIC_LATINO)
}

/// The five race flags, each checked independently against the race column.
pub fn race_flags(race: &str) -> [(Field, &'static str); 5] {
    RACE_FLAGS.map(|(field, value)| (field, flag(race == value)))
}

/// Zone-indicator columns whose value marks the student exempt.
pub fn exemptions(merged: &MergedRow) -> BTreeSet<String> {
    merged
        .iter()
        .filter(|(column, value)| column.contains(ZONE_MARKER) && *value == EXEMPT_VALUE)
        .map(|(column, _)| column.to_string())
        .collect()
}
