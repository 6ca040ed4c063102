//! Mutually exclusive test groups.
//!
//! A PFAI test category (aerobic capacity, body composition, ...) can be
//! satisfied by one of several alternative [`SubForm`]s. Resolution keeps the
//! first sub-form, in priority order, whose every field matches its pattern and
//! clears the fields of all the others. If none matches the record is left
//! untouched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::StudentRecord;
use crate::schema::Field;

/// A field and the pattern its value must fully match.
#[derive(Debug, Clone)]
pub struct FieldCheck {
    pub field: Field,
    pub pattern: Regex,
}

impl FieldCheck {
    fn new(field: Field, pattern: &str) -> Self {
        Self {
            field,
            pattern: Regex::new(pattern).expect("invalid field pattern"),
        }
    }

    pub fn passes(&self, record: &StudentRecord) -> bool {
        self.pattern.is_match(record.get(self.field))
    }
}

/// One alternative way of satisfying a test category.
#[derive(Debug, Clone)]
pub struct SubForm {
    pub name: &'static str,
    pub checks: Vec<FieldCheck>,
}

impl SubForm {
    fn new(name: &'static str, checks: &[(Field, &str)]) -> Self {
        Self {
            name,
            checks: checks
                .iter()
                .map(|(field, pattern)| FieldCheck::new(*field, pattern))
                .collect(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.checks.iter().map(|c| c.field)
    }

    pub fn is_valid(&self, record: &StudentRecord) -> bool {
        self.checks.iter().all(|c| c.passes(record))
    }
}

/// A test category whose sub-forms are mutually exclusive.
#[derive(Debug, Clone)]
pub struct ExclusiveGroup {
    pub name: &'static str,
    /// Sub-forms in priority order.
    pub forms: Vec<SubForm>,
    /// Zone columns that exempt a student from this category.
    pub exemption_markers: &'static [&'static str],
    /// Warning text used when no sub-form is valid.
    pub requirement: &'static str,
}

/// What resolving a group did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// This sub-form was kept; the others were cleared.
    Kept(&'static str),
    /// Nothing valid, but the student is exempt.
    Exempt,
    /// Nothing valid and not exempt.
    Missing,
}

impl ExclusiveGroup {
    /// Keep the first valid sub-form and clear every other sub-form's fields.
    pub fn resolve(&self, record: &mut StudentRecord) -> Resolution {
        let Some(kept) = self.forms.iter().position(|f| f.is_valid(record)) else {
            return if record.is_exempt_from(self.exemption_markers) {
                Resolution::Exempt
            } else {
                Resolution::Missing
            };
        };

        let keep: Vec<Field> = self.forms[kept].fields().collect();
        for (i, form) in self.forms.iter().enumerate() {
            if i == kept {
                continue;
            }
            for field in form.fields().filter(|f| !keep.contains(f)) {
                record.clear(field);
            }
        }

        Resolution::Kept(self.forms[kept].name)
    }
}

const WHOLE: &str = r"^\d+$";
const SECONDS: &str = r"^[0-5]\d$";

/// The four exclusive categories of the PFAI report.
pub static EXCLUSIVE_GROUPS: Lazy<Vec<ExclusiveGroup>> = Lazy::new(|| {
    vec![
        ExclusiveGroup {
            name: "Body Composition",
            forms: vec![
                SubForm::new("Height/Weight", &[(Field::Height, WHOLE), (Field::Weight, WHOLE)]),
                SubForm::new(
                    "Skinfold",
                    &[(Field::SkinfoldTricep, WHOLE), (Field::SkinfoldCalf, WHOLE)],
                ),
            ],
            exemption_markers: &["BodyCompHFZ", "BMIHFZ", "PercentFatHFZ"],
            requirement: "Height (integer inches) and Weight (integer lbs) or \
                Skinfold Tricep (integer) and Skinfold Calf (integer) must have data",
        },
        ExclusiveGroup {
            name: "Aerobic Capacity",
            forms: vec![
                SubForm::new(
                    "1 Mile Run",
                    &[(Field::MileRunMinutes, WHOLE), (Field::MileRunSeconds, SECONDS)],
                ),
                SubForm::new("PACER", &[(Field::PacerLaps, r"^(\d|[1-9]\d|[1-3]\d{2})$")]),
                SubForm::new(
                    "1 Mile Walk",
                    &[
                        (Field::MileWalkMinutes, WHOLE),
                        (Field::MileWalkSeconds, SECONDS),
                        (Field::MileWalkHeartRate, WHOLE),
                    ],
                ),
            ],
            exemption_markers: &["AerobicCapacityHFZ"],
            requirement: "1 Mile Run (integer Minutes, Seconds), PACER Laps (0-300), or \
                1 Mile Walk (integer Minutes, Seconds, Heart Rate) must have data",
        },
        ExclusiveGroup {
            name: "Muscular Strength and Endurance",
            forms: vec![
                SubForm::new("Push Up", &[(Field::PushUp, r"^(\d|[1-9]\d)$")]),
                SubForm::new(
                    "Modified Pull Up",
                    &[(Field::ModifiedPullUp, r"^(\d|[1-9]\d|[1-9]\d{2})$")],
                ),
                SubForm::new(
                    "Flexed Arm Hang",
                    &[(Field::FlexedArmHang, r"^(\d|[1-9]\d|[1-9]\d{2})$")],
                ),
            ],
            exemption_markers: &["PushupHFZ", "ModifiedPullupHFZ", "FAHHFZ"],
            requirement: "Push Up (integer 0-99), Modified Pull Up (integer 0-999), or \
                Flexed Arm Hang (integer 0-999) must have data",
        },
        ExclusiveGroup {
            name: "Flexibility",
            forms: vec![
                SubForm::new(
                    "Back Saver Sit & Reach",
                    &[
                        (Field::SitAndReachLeft, r"^(\d|1[0-2])$"),
                        (Field::SitAndReachRight, r"^(\d|1[0-2])$"),
                    ],
                ),
                SubForm::new(
                    "Shoulder Stretch",
                    &[
                        (Field::ShoulderStretchLeft, r"^[1-2]$"),
                        (Field::ShoulderStretchRight, r"^[1-2]$"),
                    ],
                ),
            ],
            exemption_markers: &["SitandReachHFZ", "ShoulderStretchHFZ"],
            requirement: "Back Saver Sit & Reach-Left (integer 0-12) and Back Saver Sit & Reach-Right \
                (integer 0-12) or Shoulder Stretch-Left (integer 1-2) and Shoulder Stretch-Right \
                (integer 1-2) must have data",
        },
    ]
});

/// Look up one of the built-in groups by name.
pub fn group(name: &str) -> Option<&'static ExclusiveGroup> {
    EXCLUSIVE_GROUPS.iter().find(|g| g.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(Field, &str)]) -> StudentRecord {
        let mut rec = StudentRecord::new("1");
        for (field, value) in pairs {
            rec.set(*field, *value);
        }
        rec
    }

    #[test]
    fn test_body_composition_prefers_height_weight() {
        let group = group("Body Composition").unwrap();
        let mut rec = record(&[
            (Field::Height, "54"),
            (Field::Weight, "80"),
            (Field::SkinfoldTricep, "12"),
            (Field::SkinfoldCalf, "14"),
        ]);

        assert_eq!(group.resolve(&mut rec), Resolution::Kept("Height/Weight"));
        assert_eq!(rec.get(Field::Height), "54");
        assert_eq!(rec.get(Field::Weight), "80");
        assert_eq!(rec.get(Field::SkinfoldTricep), "");
        assert_eq!(rec.get(Field::SkinfoldCalf), "");
    }

    #[test]
    fn test_body_composition_falls_back_to_skinfold() {
        let group = group("Body Composition").unwrap();
        let mut rec = record(&[
            (Field::Height, ""),
            (Field::Weight, "80"),
            (Field::SkinfoldTricep, "12"),
            (Field::SkinfoldCalf, "14"),
        ]);

        assert_eq!(group.resolve(&mut rec), Resolution::Kept("Skinfold"));
        assert_eq!(rec.get(Field::Weight), "");
        assert_eq!(rec.get(Field::SkinfoldTricep), "12");
    }

    #[test]
    fn test_aerobic_priority() {
        let group = group("Aerobic Capacity").unwrap();
        let mut rec = record(&[
            (Field::MileRunMinutes, "9"),
            (Field::MileRunSeconds, "75"),
            (Field::PacerLaps, "42"),
            (Field::MileWalkMinutes, "15"),
            (Field::MileWalkSeconds, "30"),
            (Field::MileWalkHeartRate, "120"),
        ]);

        assert_eq!(group.resolve(&mut rec), Resolution::Kept("PACER"));
        assert_eq!(rec.get(Field::PacerLaps), "42");
        for field in [
            Field::MileRunMinutes,
            Field::MileRunSeconds,
            Field::MileWalkMinutes,
            Field::MileWalkSeconds,
            Field::MileWalkHeartRate,
        ] {
            assert_eq!(rec.get(field), "", "{} should be cleared", field);
        }
    }

    #[test]
    fn test_pacer_range() {
        let group = group("Aerobic Capacity").unwrap();
        for (laps, ok) in [("0", true), ("42", true), ("399", true), ("400", false), ("042", false)] {
            let mut rec = record(&[(Field::PacerLaps, laps)]);
            let kept = matches!(group.resolve(&mut rec), Resolution::Kept(_));
            assert_eq!(kept, ok, "laps {}", laps);
        }
    }

    #[test]
    fn test_strength_falls_through_to_flexed_arm_hang() {
        let group = group("Muscular Strength and Endurance").unwrap();
        let mut rec = record(&[
            (Field::PushUp, "100"),
            (Field::ModifiedPullUp, "x"),
            (Field::FlexedArmHang, "35"),
        ]);

        assert_eq!(group.resolve(&mut rec), Resolution::Kept("Flexed Arm Hang"));
        assert_eq!(rec.get(Field::PushUp), "");
        assert_eq!(rec.get(Field::ModifiedPullUp), "");
        assert_eq!(rec.get(Field::FlexedArmHang), "35");
    }

    #[test]
    fn test_aerobic_falls_through_to_walk() {
        let group = group("Aerobic Capacity").unwrap();
        let mut rec = record(&[
            (Field::MileRunMinutes, "9"),
            (Field::MileRunSeconds, ""),
            (Field::PacerLaps, "400"),
            (Field::MileWalkMinutes, "15"),
            (Field::MileWalkSeconds, "07"),
            (Field::MileWalkHeartRate, "132"),
        ]);

        assert_eq!(group.resolve(&mut rec), Resolution::Kept("1 Mile Walk"));
        assert_eq!(rec.get(Field::MileRunMinutes), "");
        assert_eq!(rec.get(Field::MileRunSeconds), "");
        assert_eq!(rec.get(Field::PacerLaps), "");
        assert_eq!(rec.get(Field::MileWalkMinutes), "15");
        assert_eq!(rec.get(Field::MileWalkSeconds), "07");
        assert_eq!(rec.get(Field::MileWalkHeartRate), "132");
    }

    #[test]
    fn test_walk_needs_every_field() {
        let group = group("Aerobic Capacity").unwrap();
        for (minutes, seconds, rate) in [("15", "7", "132"), ("15", "07", ""), ("", "07", "132")] {
            let mut rec = record(&[
                (Field::MileWalkMinutes, minutes),
                (Field::MileWalkSeconds, seconds),
                (Field::MileWalkHeartRate, rate),
            ]);
            assert_eq!(group.resolve(&mut rec), Resolution::Missing, "{} {} {}", minutes, seconds, rate);
        }
    }

    #[test]
    fn test_strength_prefers_modified_pull_up_over_hang() {
        let group = group("Muscular Strength and Endurance").unwrap();
        let mut rec = record(&[
            (Field::PushUp, "abc"),
            (Field::ModifiedPullUp, "12"),
            (Field::FlexedArmHang, "35"),
        ]);

        assert_eq!(group.resolve(&mut rec), Resolution::Kept("Modified Pull Up"));
        assert_eq!(rec.get(Field::PushUp), "");
        assert_eq!(rec.get(Field::ModifiedPullUp), "12");
        assert_eq!(rec.get(Field::FlexedArmHang), "");
    }

    #[test]
    fn test_nothing_valid_leaves_record_untouched() {
        let group = group("Flexibility").unwrap();
        let mut rec = record(&[
            (Field::SitAndReachLeft, "13"),
            (Field::SitAndReachRight, "10"),
            (Field::ShoulderStretchLeft, "3"),
        ]);
        let before = rec.clone();

        assert_eq!(group.resolve(&mut rec), Resolution::Missing);
        assert_eq!(rec, before);
    }

    #[test]
    fn test_exempt_when_nothing_valid() {
        let group = group("Flexibility").unwrap();
        let mut rec = record(&[]);
        rec.exemptions.insert("ShoulderStretchHFZ".to_string());
        assert_eq!(group.resolve(&mut rec), Resolution::Exempt);
    }

    #[test]
    fn test_every_group_has_ordered_forms() {
        let names: Vec<&str> = EXCLUSIVE_GROUPS.iter().map(|g| g.name).collect();
        assert_eq!(
            names,
            vec![
                "Body Composition",
                "Aerobic Capacity",
                "Muscular Strength and Endurance",
                "Flexibility"
            ]
        );
        assert!(EXCLUSIVE_GROUPS.iter().all(|g| g.forms.len() >= 2));
    }
}
