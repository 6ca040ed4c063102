//! Fixed PFAI output schema and its mapping onto FitnessGram export columns.
//!
//! The destination schema is closed: every [`Field`] is one PFAI column, and
//! [`FIELD_MAP`] lists them in output order alongside the (whitespace-stripped)
//! FitnessGram column each one is read from. Several destination fields are
//! computed rather than copied; their "source" is the synthetic name the
//! derivation step writes into the merged row before translation.

use std::fmt;

// =============================================================================
// Destination fields
// =============================================================================

/// One column of the PFAI report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    SchoolId,
    SchoolName,
    TestDate,
    StudentDob,
    StudentGrade,
    StudentGender,
    Height,
    Weight,
    SkinfoldTricep,
    SkinfoldCalf,
    MileRunMinutes,
    MileRunSeconds,
    PacerLaps,
    MileWalkMinutes,
    MileWalkSeconds,
    MileWalkHeartRate,
    CurlUp,
    TrunkLift,
    PushUp,
    ModifiedPullUp,
    FlexedArmHang,
    SitAndReachLeft,
    SitAndReachRight,
    ShoulderStretchLeft,
    ShoulderStretchRight,
    IsHispanicLatino,
    IsAmericanIndianAlaskaNative,
    IsAsian,
    IsBlackAfricanAmerican,
    IsNativeHawaiianOtherPacificIslander,
    IsWhite,
}

/// Number of destination columns.
pub const FIELD_COUNT: usize = 31;

impl Field {
    /// Exact PFAI column header.
    pub fn header(self) -> &'static str {
        match self {
            Field::SchoolId => "School ID",
            Field::SchoolName => "School Name",
            Field::TestDate => "Test Date",
            Field::StudentDob => "Student DOB",
            Field::StudentGrade => "Student Grade",
            Field::StudentGender => "Student Gender",
            Field::Height => "Height",
            Field::Weight => "Weight",
            Field::SkinfoldTricep => "Skinfold Tricep",
            Field::SkinfoldCalf => "Skinfold Calf",
            Field::MileRunMinutes => "1 Mile Run (Minutes)",
            Field::MileRunSeconds => "1 Mile Run (Seconds)",
            Field::PacerLaps => "PACER Laps",
            Field::MileWalkMinutes => "1 Mile Walk (Minutes)",
            Field::MileWalkSeconds => "1 Mile Walk (Seconds)",
            Field::MileWalkHeartRate => "1 Mile Walk Heart Rate",
            Field::CurlUp => "Curl Up",
            Field::TrunkLift => "Trunk Lift",
            Field::PushUp => "Push Up",
            Field::ModifiedPullUp => "Modified Pull Up",
            Field::FlexedArmHang => "Flexed Arm Hang",
            Field::SitAndReachLeft => "Back Saver Sit & Reach-Left",
            Field::SitAndReachRight => "Back Saver Sit & Reach-Right",
            Field::ShoulderStretchLeft => "Shoulder Stretch-Left",
            Field::ShoulderStretchRight => "Shoulder Stretch-Right",
            Field::IsHispanicLatino => "IsHispanicLatino",
            Field::IsAmericanIndianAlaskaNative => "IsAmericanIndianAlaskaNative",
            Field::IsAsian => "IsAsian",
            Field::IsBlackAfricanAmerican => "IsBlackAfricanAmerican",
            Field::IsNativeHawaiianOtherPacificIslander => "IsNativeHawaiianOtherPacificIslander",
            Field::IsWhite => "IsWhite",
        }
    }

    /// Position of this field in the output column order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a destination field by its exact PFAI header.
    pub fn from_header(header: &str) -> Option<Field> {
        FIELD_MAP
            .iter()
            .map(|(field, _)| *field)
            .find(|field| field.header() == header)
    }

    /// All destination fields in output order.
    pub fn all() -> impl Iterator<Item = Field> {
        FIELD_MAP.iter().map(|(field, _)| *field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// =============================================================================
// Destination -> source mapping
// =============================================================================

/// Destination field paired with the merged-row column it is taken from.
///
/// Order here is the PFAI output column order.
pub const FIELD_MAP: [(Field, &str); FIELD_COUNT] = [
    (Field::SchoolId, source::SCHOOL_ID),
    (Field::SchoolName, "SchoolName"),
    (Field::TestDate, derived::TEST_DATE),
    (Field::StudentDob, source::STUDENT_DOB),
    (Field::StudentGrade, "Grade"),
    (Field::StudentGender, "Gender"),
    (Field::Height, derived::HEIGHT),
    (Field::Weight, source::WEIGHT),
    (Field::SkinfoldTricep, "TricepsSkinfold"),
    (Field::SkinfoldCalf, "CalfSkinfold"),
    (Field::MileRunMinutes, "OneMileRunMin"),
    (Field::MileRunSeconds, "OneMileRunSec"),
    (Field::PacerLaps, derived::PACER_LAPS),
    (Field::MileWalkMinutes, "WalkTestMinutes"),
    (Field::MileWalkSeconds, "WalkTestSeconds"),
    (Field::MileWalkHeartRate, "WalkTestHeartRate"),
    (Field::CurlUp, "Curlup"),
    (Field::TrunkLift, "TrunkLift"),
    (Field::PushUp, "Pushup"),
    (Field::ModifiedPullUp, "ModifiedPullup"),
    (Field::FlexedArmHang, "FlexedArmHang"),
    (Field::SitAndReachLeft, "SitandReachL"),
    (Field::SitAndReachRight, "SitandReachR"),
    (Field::ShoulderStretchLeft, "ShoulderStretchL"),
    (Field::ShoulderStretchRight, "ShoulderStretchR"),
    (Field::IsHispanicLatino, "IsHispanicLatino"),
    (Field::IsAmericanIndianAlaskaNative, "IsAmericanIndianAlaskaNative"),
    (Field::IsAsian, "IsAsian"),
    (Field::IsBlackAfricanAmerican, "IsBlackAfricanAmerican"),
    (Field::IsNativeHawaiianOtherPacificIslander, "IsNativeHawaiianOtherPacificIslander"),
    (Field::IsWhite, "IsWhite"),
];

/// FitnessGram export column names (header whitespace already stripped).
pub mod source {
    pub const STUDENT_ID: &str = "StudentID";
    pub const SCHOOL_ID: &str = "SchoolID";
    pub const STUDENT_DOB: &str = "StudentDOB";
    pub const TEST_EVENT_END_DATE: &str = "TestEventEndDate";
    pub const HEIGHT_FEET: &str = "HeightFT";
    pub const HEIGHT_INCHES: &str = "HeightIN";
    pub const WEIGHT: &str = "Weight";
    pub const PACER_15: &str = "PACER15laps";
    pub const PACER_20: &str = "PACER20laps";
    pub const ETHNICITY: &str = "Ethnicity";
    pub const RACE: &str = "Race";
}

/// Synthetic merged-row columns written by the derivation step.
pub mod derived {
    pub const TEST_DATE: &str = "TestDate";
    pub const HEIGHT: &str = "Height";
    pub const PACER_LAPS: &str = "PACER Laps";
}

/// Columns a FitnessGram export must carry for a conversion to run.
///
/// `HeightFT`/`HeightIN` are optional: without them Height is left blank.
pub fn required_source_columns() -> Vec<&'static str> {
    let derived_names = [derived::TEST_DATE, derived::HEIGHT, derived::PACER_LAPS];
    let mut columns = vec![
        source::STUDENT_ID,
        source::TEST_EVENT_END_DATE,
        source::PACER_15,
        source::PACER_20,
        source::ETHNICITY,
        source::RACE,
    ];
    columns.extend(
        FIELD_MAP
            .iter()
            .map(|(_, src)| *src)
            .filter(|src| !derived_names.contains(src))
            .filter(|src| !RACE_FLAGS.iter().any(|(flag, _)| flag.header() == *src))
            .filter(|src| *src != Field::IsHispanicLatino.header()),
    );
    columns
}

// =============================================================================
// Sentinels
// =============================================================================

/// Join column of the override file.
pub const OVERRIDE_ID_COLUMN: &str = "Student ID";

/// Marks a "healthy fitness zone" column in the export.
pub const ZONE_MARKER: &str = "HFZ";

/// Zone value meaning the student is exempt from that test.
pub const EXEMPT_VALUE: &str = "11";

/// Ethnicity value that sets `IsHispanicLatino`.
pub const HISPANIC_LATINO: &str = "Hispanic or Latino";

/// Race flag fields and the race value that sets each one.
pub const RACE_FLAGS: [(Field, &str); 5] = [
    (Field::IsAmericanIndianAlaskaNative, "American Indian or Alaska Native"),
    (Field::IsAsian, "Asian"),
    (Field::IsBlackAfricanAmerican, "Black or African American"),
    (Field::IsNativeHawaiianOtherPacificIslander, "Native Hawaiian or Other Pacific Islander"),
    (Field::IsWhite, "White"),
];

/// All six race/ethnicity flag fields.
pub const ETHNICITY_FLAGS: [Field; 6] = [
    Field::IsHispanicLatino,
    Field::IsAmericanIndianAlaskaNative,
    Field::IsAsian,
    Field::IsBlackAfricanAmerican,
    Field::IsNativeHawaiianOtherPacificIslander,
    Field::IsWhite,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_map_order() {
        for (i, (field, _)) in FIELD_MAP.iter().enumerate() {
            assert_eq!(field.index(), i, "{} out of order", field);
        }
    }

    #[test]
    fn test_from_header() {
        assert_eq!(Field::from_header("PACER Laps"), Some(Field::PacerLaps));
        assert_eq!(
            Field::from_header("Back Saver Sit & Reach-Left"),
            Some(Field::SitAndReachLeft)
        );
        assert_eq!(Field::from_header("Student ID"), None);
    }

    #[test]
    fn test_required_columns_exclude_derived() {
        let cols = required_source_columns();
        assert!(cols.contains(&"StudentID"));
        assert!(cols.contains(&"SchoolName"));
        assert!(cols.contains(&"Weight"));
        assert!(!cols.contains(&"HeightFT"));
        assert!(!cols.contains(&"HeightIN"));
        assert!(!cols.contains(&"TestDate"));
        assert!(!cols.contains(&"PACER Laps"));
        assert!(!cols.contains(&"IsAsian"));
        assert!(!cols.contains(&"IsHispanicLatino"));
    }
}
