use serde::Serialize;

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// One learner's merged record. Built by the achievement ingestor; the
/// reconciler stamps `proctoring` exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    /// Patronymic; empty when the export has none.
    pub second_name: String,
    pub grade: Grade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proctoring: Option<ProctoringStatus>,
}

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// ECTS letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    /// Map a 0-100 percent to a letter. The percent is truncated to an
    /// integer first, never rounded: 89.999 is a B.
    pub fn from_percent(percent: f64) -> Self {
        match percent.trunc() as i64 {
            p if p >= 90 => Self::A,
            p if p >= 80 => Self::B,
            p if p >= 70 => Self::C,
            p if p >= 61 => Self::D,
            p if p >= 50 => Self::E,
            _ => Self::F,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
            Self::E => write!(f, "E"),
            Self::F => write!(f, "F"),
        }
    }
}

// ---------------------------------------------------------------------------
// Proctoring status
// ---------------------------------------------------------------------------

/// Outcome of a proctored exam session.
///
/// The report stores this as one of two literal tokens; everything past the
/// ingestion boundary works with this tagged type instead of raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProctoringStatus {
    Passed,
    Failed,
}

impl ProctoringStatus {
    /// Case-sensitive literal match against the configured tokens.
    /// Anything else is uninterpretable and left to the caller to report.
    pub fn parse(cell: &str, pass_token: &str, fail_token: &str) -> Option<Self> {
        if cell == pass_token {
            Some(Self::Passed)
        } else if cell == fail_token {
            Some(Self::Failed)
        } else {
            None
        }
    }

    pub fn passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The sentinel token this status is written back as.
    pub fn token<'a>(self, pass_token: &'a str, fail_token: &'a str) -> &'a str {
        match self {
            Self::Passed => pass_token,
            Self::Failed => fail_token,
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation result
// ---------------------------------------------------------------------------

/// Ordered roster plus the emails that had no proctoring record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterResult {
    /// `(student, proctoring passed)`, ordered by the numeric id embedded
    /// in the student email.
    pub students: Vec<(Student, bool)>,
    /// Achievement emails with no proctoring match, in insertion order.
    pub unmatched: Vec<String>,
}
