//! Builds the keyed registries from validated rows.
//!
//! Achievement rows become `email -> Student`, proctoring rows become
//! `email -> passed`. Parse failures are recoverable row errors sharing the
//! validator's ceiling; a duplicate email is an immediate hard error.

use std::collections::HashMap;

use crate::config::{AchievementConfig, GradeScale, ProctoringConfig};
use crate::error::RosterError;
use crate::model::{Grade, ProctoringStatus, Student};
use crate::validate::{note_error, ValidatedSheet};

// Achievement value layout, fixed by the pipeline's required-column order.
const EMAIL: usize = 0;
const LAST_NAME: usize = 1;
const FIRST_NAME: usize = 2;
const SECOND_NAME: usize = 3;
const GRADE: usize = 4;
const CONTROL: usize = 5;

// Proctoring value layout.
const STATUS: usize = 1;

/// Build the achievement registry. Returns the registry together with the
/// accumulated error-row list (which may have grown past validation).
pub fn build_achievement_registry(
    validated: ValidatedSheet,
    config: &AchievementConfig,
) -> Result<(HashMap<String, Student>, Vec<String>), RosterError> {
    let ValidatedSheet { rows, mut error_rows } = validated;
    let mut registry = HashMap::with_capacity(rows.len());

    for row in rows {
        let percent = match parse_decimal(&row.values[GRADE]) {
            Some(value) => match config.grade_scale {
                GradeScale::Fraction => value * 100.0,
                GradeScale::Percent => value,
            },
            None => {
                if note_error(&mut error_rows, row.row, config.max_error_rows) {
                    return Err(RosterError::TooManyErrorRows { rows: error_rows });
                }
                continue;
            }
        };

        // Control-tasks gate: a zero completion share fails the course
        // regardless of the assessment percent. A blank cell skips the gate.
        let mut gated = false;
        if config.control_column.is_some() {
            let cell = &row.values[CONTROL];
            if !cell.is_empty() {
                match parse_decimal(cell) {
                    Some(share) => gated = share <= 0.0,
                    None => {
                        if note_error(&mut error_rows, row.row, config.max_error_rows) {
                            return Err(RosterError::TooManyErrorRows { rows: error_rows });
                        }
                        continue;
                    }
                }
            }
        }

        let email = &row.values[EMAIL];
        if registry.contains_key(email) {
            return Err(RosterError::DuplicateStudent { email: email.clone() });
        }
        let grade = if gated { Grade::F } else { Grade::from_percent(percent) };
        registry.insert(
            email.clone(),
            Student {
                email: email.clone(),
                last_name: row.values[LAST_NAME].clone(),
                first_name: row.values[FIRST_NAME].clone(),
                second_name: row.values[SECOND_NAME].clone(),
                grade,
                proctoring: None,
            },
        );
    }

    Ok((registry, error_rows))
}

/// Build the proctoring registry. Uninterpretable status cells are row
/// errors; duplicates among interpretable rows are immediate hard errors.
pub fn build_proctoring_registry(
    validated: ValidatedSheet,
    config: &ProctoringConfig,
) -> Result<(HashMap<String, bool>, Vec<String>), RosterError> {
    let ValidatedSheet { rows, mut error_rows } = validated;
    let mut registry = HashMap::with_capacity(rows.len());

    for row in rows {
        let email = &row.values[EMAIL];
        match ProctoringStatus::parse(&row.values[STATUS], &config.pass_token, &config.fail_token) {
            Some(status) => {
                if registry.contains_key(email) {
                    return Err(RosterError::DuplicateStudent { email: email.clone() });
                }
                registry.insert(email.clone(), status.passed());
            }
            None => {
                if note_error(&mut error_rows, row.row, config.max_error_rows) {
                    return Err(RosterError::TooManyErrorRows { rows: error_rows });
                }
            }
        }
    }

    Ok((registry, error_rows))
}

fn parse_decimal(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AchievementConfig, ProctoringConfig};
    use crate::validate::ValidRow;

    fn achievement_row(email: &str, grade_cell: &str, control: &str, row: u32) -> ValidRow {
        ValidRow {
            values: vec![
                email.to_string(),
                "Doe".to_string(),
                "Jane".to_string(),
                String::new(),
                grade_cell.to_string(),
                control.to_string(),
            ],
            row,
        }
    }

    fn sheet(rows: Vec<ValidRow>) -> ValidatedSheet {
        ValidatedSheet {
            rows,
            error_rows: Vec::new(),
        }
    }

    #[test]
    fn fraction_scale_builds_letter_grades() {
        let config = AchievementConfig::default();
        let rows = vec![
            achievement_row("st000001@x", "0.9", "0.8", 2),
            achievement_row("st000002@x", "0.55", "0.8", 3),
        ];
        let (registry, errors) = build_achievement_registry(sheet(rows), &config).unwrap();
        assert!(errors.is_empty());
        assert_eq!(registry["st000001@x"].grade, Grade::A);
        assert_eq!(registry["st000002@x"].grade, Grade::E);
    }

    #[test]
    fn percent_scale_skips_the_scaling() {
        let config = AchievementConfig {
            grade_scale: GradeScale::Percent,
            ..AchievementConfig::default()
        };
        let rows = vec![achievement_row("st000001@x", "89.9", "1", 2)];
        let (registry, _) = build_achievement_registry(sheet(rows), &config).unwrap();
        assert_eq!(registry["st000001@x"].grade, Grade::B);
    }

    #[test]
    fn unparsable_grade_is_a_recoverable_row_error() {
        let config = AchievementConfig::default();
        let rows = vec![
            achievement_row("st000001@x", "n/a", "0.8", 2),
            achievement_row("st000002@x", "0.75", "0.8", 3),
        ];
        let (registry, errors) = build_achievement_registry(sheet(rows), &config).unwrap();
        assert_eq!(errors, vec!["2".to_string()]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry["st000002@x"].grade, Grade::C);
    }

    #[test]
    fn control_tasks_zero_forces_f() {
        let config = AchievementConfig::default();
        let rows = vec![
            achievement_row("st000001@x", "0.95", "0", 2),
            achievement_row("st000002@x", "0.95", "0.5", 3),
            achievement_row("st000003@x", "0.95", "", 4),
        ];
        let (registry, errors) = build_achievement_registry(sheet(rows), &config).unwrap();
        assert!(errors.is_empty());
        assert_eq!(registry["st000001@x"].grade, Grade::F);
        assert_eq!(registry["st000002@x"].grade, Grade::A);
        // Blank control cell skips the gate.
        assert_eq!(registry["st000003@x"].grade, Grade::A);
    }

    #[test]
    fn duplicate_email_fails_immediately() {
        let config = AchievementConfig::default();
        let rows = vec![
            achievement_row("st000001@x", "0.9", "1", 2),
            achievement_row("st000001@x", "0.5", "1", 3),
            achievement_row("st000002@x", "0.7", "1", 4),
        ];
        let err = build_achievement_registry(sheet(rows), &config).unwrap_err();
        assert_eq!(
            err,
            RosterError::DuplicateStudent { email: "st000001@x".into() }
        );
    }

    #[test]
    fn grade_errors_extend_the_validators_list_up_to_the_ceiling() {
        let config = AchievementConfig {
            max_error_rows: 2,
            ..AchievementConfig::default()
        };
        let validated = ValidatedSheet {
            rows: vec![
                achievement_row("st000001@x", "bad", "1", 5),
                achievement_row("st000002@x", "bad", "1", 6),
            ],
            error_rows: vec!["2".to_string()],
        };
        let err = build_achievement_registry(validated, &config).unwrap_err();
        match err {
            RosterError::TooManyErrorRows { rows } => {
                assert_eq!(rows, vec!["2".to_string(), "5".to_string(), "6".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn proctoring_row(email: &str, status: &str, row: u32) -> ValidRow {
        ValidRow {
            values: vec![email.to_string(), status.to_string()],
            row,
        }
    }

    #[test]
    fn proctoring_tokens_map_to_booleans() {
        let config = ProctoringConfig::default();
        let rows = vec![
            proctoring_row("st000001@x", "yes", 2),
            proctoring_row("st000002@x", "no", 3),
        ];
        let (registry, errors) = build_proctoring_registry(sheet(rows), &config).unwrap();
        assert!(errors.is_empty());
        assert_eq!(registry["st000001@x"], true);
        assert_eq!(registry["st000002@x"], false);
    }

    #[test]
    fn unknown_status_is_a_row_error_not_a_fault() {
        let config = ProctoringConfig::default();
        let rows = vec![
            proctoring_row("st000001@x", "Yes", 2),
            proctoring_row("st000002@x", "no", 3),
        ];
        let (registry, errors) = build_proctoring_registry(sheet(rows), &config).unwrap();
        assert_eq!(errors, vec!["2".to_string()]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn proctoring_duplicate_fails_immediately() {
        let config = ProctoringConfig::default();
        let rows = vec![
            proctoring_row("st000001@x", "yes", 2),
            proctoring_row("st000001@x", "no", 3),
        ];
        let err = build_proctoring_registry(sheet(rows), &config).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateStudent { .. }));
    }

    #[test]
    fn duplicate_check_ignores_uninterpretable_rows() {
        // A row whose status cell is garbage never reaches the registry,
        // so a later valid row with the same email is not a duplicate.
        let config = ProctoringConfig::default();
        let rows = vec![
            proctoring_row("st000001@x", "???", 2),
            proctoring_row("st000001@x", "yes", 3),
        ];
        let (registry, errors) = build_proctoring_registry(sheet(rows), &config).unwrap();
        assert_eq!(errors, vec!["2".to_string()]);
        assert_eq!(registry["st000001@x"], true);
    }
}
