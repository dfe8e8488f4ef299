use serde::{Deserialize, Serialize};

use crate::error::RosterError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// All tunable pipeline policy: column names, status tokens, ceilings, the
/// email shape, and the grade-cell representation. `Default` carries the
/// stock values of the course-platform exports.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RosterConfig {
    pub achievement: AchievementConfig,
    pub proctoring: ProctoringConfig,
    pub limits: LimitConfig,
    pub email: EmailConfig,
}

// ---------------------------------------------------------------------------
// Achievement file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AchievementConfig {
    pub email_column: String,
    pub last_name_column: String,
    pub first_name_column: String,
    pub second_name_column: String,
    /// Column holding the course grade value.
    pub grade_column: String,
    /// Secondary gating metric; a parseable value <= 0 forces an F.
    /// `None` disables the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_column: Option<String>,
    /// How the grade cell encodes the percent.
    pub grade_scale: GradeScale,
    /// Allowed number of rows containing errors before the upload is
    /// rejected outright.
    pub max_error_rows: usize,
    /// Restrict ingestion to one cohort before validation; rows failing
    /// the condition are skipped, not counted as errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionConfig>,
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            email_column: "Email".into(),
            last_name_column: "Last Name".into(),
            first_name_column: "First Name".into(),
            second_name_column: "Second Name".into(),
            grade_column: "Final Assessment (Avg)".into(),
            control_column: Some("Control Tasks (Avg)".into()),
            grade_scale: GradeScale::Fraction,
            max_error_rows: 150,
            selection: None,
        }
    }
}

/// The observed exports disagree on the grade representation, so the axis
/// is explicit config rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeScale {
    /// The cell stores a 0-1 fraction; scaled by 100 before truncation.
    Fraction,
    /// The cell stores a whole 0-100 percent.
    Percent,
}

/// Cohort filter: keep only rows whose selection cell contains the needle,
/// matched case-insensitively.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    pub column: String,
    pub contains: String,
}

// ---------------------------------------------------------------------------
// Proctoring file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProctoringConfig {
    pub email_column: String,
    pub status_column: String,
    /// Literal token meaning the proctoring session was accepted.
    pub pass_token: String,
    /// Literal token meaning it was rejected.
    pub fail_token: String,
    pub max_error_rows: usize,
}

impl Default for ProctoringConfig {
    fn default() -> Self {
        Self {
            email_column: "User email".into(),
            status_column: "Status is correct".into(),
            pass_token: "yes".into(),
            fail_token: "no".into(),
            max_error_rows: 150,
        }
    }
}

// ---------------------------------------------------------------------------
// Limits + email shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Upload size cap in bytes.
    pub max_file_bytes: u64,
    /// Allowed number of achievement students with no proctoring record.
    pub max_unmatched_students: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 3 * 1024 * 1024,
            max_unmatched_students: 150,
        }
    }
}

/// Expected shape of the student email local part: `<prefix><digits>@...`.
/// The digits are the roster sort key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    pub prefix: String,
    pub digits: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            prefix: "st".into(),
            digits: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RosterConfig {
    pub fn from_toml(input: &str) -> Result<Self, RosterError> {
        let config: RosterConfig =
            toml::from_str(input).map_err(|e| RosterError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        let a = &self.achievement;
        let named_columns = [
            ("achievement.email_column", &a.email_column),
            ("achievement.last_name_column", &a.last_name_column),
            ("achievement.first_name_column", &a.first_name_column),
            ("achievement.second_name_column", &a.second_name_column),
            ("achievement.grade_column", &a.grade_column),
            ("proctoring.email_column", &self.proctoring.email_column),
            ("proctoring.status_column", &self.proctoring.status_column),
        ];
        for (field, value) in named_columns {
            if value.is_empty() {
                return Err(RosterError::ConfigValidation(format!(
                    "{field} must not be empty"
                )));
            }
        }

        if let Some(ref control) = a.control_column {
            if control.is_empty() {
                return Err(RosterError::ConfigValidation(
                    "achievement.control_column must not be empty when set".into(),
                ));
            }
        }

        if let Some(ref selection) = a.selection {
            if selection.column.is_empty() || selection.contains.is_empty() {
                return Err(RosterError::ConfigValidation(
                    "achievement.selection requires a column and a non-empty needle".into(),
                ));
            }
        }

        let p = &self.proctoring;
        if p.pass_token.is_empty() || p.fail_token.is_empty() {
            return Err(RosterError::ConfigValidation(
                "proctoring tokens must not be empty".into(),
            ));
        }
        if p.pass_token == p.fail_token {
            return Err(RosterError::ConfigValidation(format!(
                "proctoring tokens must differ, both are '{}'",
                p.pass_token
            )));
        }

        if self.email.prefix.is_empty() || self.email.digits == 0 {
            return Err(RosterError::ConfigValidation(
                "email shape requires a prefix and at least one digit".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
