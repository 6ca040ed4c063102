//! Advisory warnings raised while deriving and validating student fields.
//!
//! Warnings never change a record or the exit status. They are collected in a
//! [`Warnings`] sink which drops them outright when warnings are disabled, so
//! a quiet run produces no diagnostic text at all. An echoing sink also prints
//! each warning to stdout the moment it is raised, so a run that later fails
//! still shows everything found up to that point.

use std::fmt;

/// A single advisory message about one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Student the warning refers to.
    pub student: String,
    /// Human-readable description naming the field, its value and the constraint.
    pub message: String,
}

impl Warning {
    pub fn new(student: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            student: student.into(),
            message: message.into(),
        }
    }

    /// `Invalid <field> "<value>"`, optionally followed by `: <expected>`.
    pub fn invalid(
        student: impl Into<String>,
        field: impl fmt::Display,
        value: &str,
        expected: Option<&str>,
    ) -> Self {
        let message = match expected {
            Some(expected) => format!("Invalid {} \"{}\": {}", field, value, expected),
            None => format!("Invalid {} \"{}\"", field, value),
        };
        Self::new(student, message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WARN: Student ({}): {}", self.student, self.message)
    }
}

/// Collects warnings when enabled; discards them otherwise.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    enabled: bool,
    echo: bool,
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            echo: false,
            entries: Vec::new(),
        }
    }

    /// A sink that records nothing.
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Print each accepted warning to stdout as it is pushed.
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn push(&mut self, warning: Warning) {
        if !self.enabled {
            return;
        }
        if self.echo {
            println!("{}", warning);
        }
        self.entries.push(warning);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    /// Warnings about one student, in the order raised.
    pub fn for_student<'a>(&'a self, student: &'a str) -> impl Iterator<Item = &'a Warning> {
        self.entries.iter().filter(move |w| w.student == student)
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_format() {
        let w = Warning::invalid("1001", "School ID", "12-3", Some("Should be 9-digit code"));
        assert_eq!(
            w.to_string(),
            "WARN: Student (1001): Invalid School ID \"12-3\": Should be 9-digit code"
        );
    }

    #[test]
    fn test_warning_without_expectation() {
        let w = Warning::invalid("7", "Test Date", "13/45/2020", None);
        assert_eq!(w.to_string(), "WARN: Student (7): Invalid Test Date \"13/45/2020\"");
    }

    #[test]
    fn test_disabled_sink_records_nothing() {
        let mut sink = Warnings::disabled();
        sink.push(Warning::new("1", "anything"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_echo_still_records() {
        let mut sink = Warnings::new(true).with_echo(true);
        sink.push(Warning::new("3", "echoed"));
        assert_eq!(sink.len(), 1);

        let mut quiet = Warnings::disabled().with_echo(true);
        quiet.push(Warning::new("3", "dropped"));
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_for_student_filters() {
        let mut sink = Warnings::new(true);
        sink.push(Warning::new("1", "a"));
        sink.push(Warning::new("2", "b"));
        sink.push(Warning::new("1", "c"));
        let msgs: Vec<&str> = sink.for_student("1").map(|w| w.message.as_str()).collect();
        assert_eq!(msgs, vec!["a", "c"]);
    }
}
