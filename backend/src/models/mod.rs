//! Domain models for the conversion pipeline.
//!
//! - [`RawRecord`] - one row of the FitnessGram export
//! - [`MergedRow`] - fill-only accumulator folding a student's rows together
//! - [`StudentRecord`] - one student, expressed in PFAI fields
//! - [`OverrideRecord`] - one row of the override file
//! - [`StudentTable`] - students keyed by identifier, in first-seen order

use std::collections::{BTreeSet, HashMap};

use crate::schema::{Field, FIELD_COUNT};

// =============================================================================
// Raw export rows
// =============================================================================

/// A single export row: column name to cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Build a row from header names and cell values.
    ///
    /// Surplus cells are ignored and missing cells are left absent.
    pub fn from_cells<'a>(
        headers: &[String],
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let fields = headers
            .iter()
            .zip(cells)
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        Self { fields }
    }

    /// Cell value, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Merge accumulator
// =============================================================================

/// Accumulates a student's rows: first non-empty value wins.
///
/// A column is *populated* once it holds a non-empty value. Later rows only
/// fill columns that are absent or still empty.
#[derive(Debug, Clone, Default)]
pub struct MergedRow {
    fields: HashMap<String, String>,
}

impl MergedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self, column: &str) -> bool {
        self.fields.get(column).is_some_and(|v| !v.is_empty())
    }

    /// Fold one row into the accumulator.
    pub fn absorb(&mut self, row: &RawRecord) {
        for (column, value) in row.iter() {
            if self.is_populated(column) {
                continue;
            }
            if !value.is_empty() || !self.fields.contains_key(column) {
                self.fields.insert(column.to_string(), value.to_string());
            }
        }
    }

    /// Current value, or `""` when absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Overwrite a column unconditionally (used by derivations).
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<&'a RawRecord> for MergedRow {
    fn from_iter<I: IntoIterator<Item = &'a RawRecord>>(iter: I) -> Self {
        let mut merged = MergedRow::new();
        for row in iter {
            merged.absorb(row);
        }
        merged
    }
}

// =============================================================================
// Student record
// =============================================================================

/// One student's PFAI fields plus the tests they are exempt from.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    /// Export `StudentID`; joins with [`OverrideRecord::id`].
    pub id: String,
    values: Vec<String>,
    /// Zone-indicator column names flagged as exempt (e.g. `AerobicCapacityHFZ`).
    pub exemptions: BTreeSet<String>,
}

impl StudentRecord {
    /// A record with every field empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: vec![String::new(); FIELD_COUNT],
            exemptions: BTreeSet::new(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn clear(&mut self, field: Field) {
        self.values[field.index()].clear();
    }

    /// True if any of the given zone columns marks this student exempt.
    pub fn is_exempt_from(&self, markers: &[&str]) -> bool {
        markers.iter().any(|m| self.exemptions.contains(*m))
    }

    /// Field values in PFAI output order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

// =============================================================================
// Override record
// =============================================================================

/// One override row: PFAI header to replacement value.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRecord {
    pub id: String,
    /// Columns in file order, including the join column itself.
    pub fields: Vec<(String, String)>,
}

// =============================================================================
// Student table
// =============================================================================

/// Students keyed by identifier, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct StudentTable {
    records: Vec<StudentRecord>,
    index: HashMap<String, usize>,
}

impl StudentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing one with the same id in place.
    pub fn insert(&mut self, record: StudentRecord) {
        match self.index.get(&record.id) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StudentRecord> {
        self.index.get(id).map(|&i| &mut self.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StudentRecord> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<StudentRecord> for StudentTable {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
        let mut table = StudentTable::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_merge_first_non_empty_wins() {
        let first = row(&[("Pushup", "12"), ("Curlup", "")]);
        let second = row(&[("Pushup", "30"), ("Curlup", "40"), ("TrunkLift", "9")]);
        let third = row(&[("Curlup", "55")]);

        let merged: MergedRow = [&first, &second, &third].into_iter().collect();

        assert_eq!(merged.get("Pushup"), "12");
        assert_eq!(merged.get("Curlup"), "40");
        assert_eq!(merged.get("TrunkLift"), "9");
    }

    #[test]
    fn test_merge_keeps_empty_when_nothing_fills() {
        let first = row(&[("Weight", "")]);
        let second = row(&[("Weight", "")]);
        let merged: MergedRow = [&first, &second].into_iter().collect();

        assert!(!merged.is_populated("Weight"));
        assert_eq!(merged.iter().count(), 1);
    }

    #[test]
    fn test_raw_record_from_cells_short_row() {
        let headers = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let rec = RawRecord::from_cells(&headers, ["1", "2"]);
        assert_eq!(rec.get("a"), "1");
        assert_eq!(rec.get("b"), "2");
        assert_eq!(rec.get("c"), "");
        assert_eq!(rec.iter().count(), 2);
    }

    #[test]
    fn test_student_table_preserves_first_seen_order() {
        let table: StudentTable = ["b", "a", "b", "c"]
            .into_iter()
            .map(StudentRecord::new)
            .collect();
        let ids: Vec<&str> = table.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(table.get("a").is_some());
        assert!(table.get("z").is_none());
    }

    #[test]
    fn test_student_record_exemptions() {
        let mut rec = StudentRecord::new("1");
        rec.exemptions.insert("FAHHFZ".to_string());
        assert!(rec.is_exempt_from(&["PushupHFZ", "FAHHFZ"]));
        assert!(!rec.is_exempt_from(&["AerobicCapacityHFZ"]));
    }
}
