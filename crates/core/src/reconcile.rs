//! The pipeline facade: owns the two registries, joins them by email, and
//! caches the reconciled roster until either registry is rebuilt.

use std::collections::HashMap;

use crate::config::{EmailConfig, RosterConfig};
use crate::error::RosterError;
use crate::ingest;
use crate::model::{ProctoringStatus, RosterResult, Student};
use crate::sheet::SheetGrid;
use crate::validate::{self, ValidationSpec};

/// One run's pipeline state. Not internally synchronized: ingestion mutates
/// the registries and the cache, so concurrent callers need exclusive
/// access.
pub struct RosterPipeline {
    config: RosterConfig,
    achievement: Option<HashMap<String, Student>>,
    proctoring: Option<HashMap<String, bool>>,
    cache: Option<RosterResult>,
}

impl RosterPipeline {
    pub fn new(config: RosterConfig) -> Self {
        Self {
            config,
            achievement: None,
            proctoring: None,
            cache: None,
        }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Validate and ingest the educational achievement sheet. On success the
    /// previous achievement registry is replaced and the reconciliation
    /// cache dropped; on failure both are left untouched. Returns the
    /// error-row numbers (empty when every row was clean).
    pub fn load_achievement(&mut self, grid: &SheetGrid) -> Result<Vec<String>, RosterError> {
        let validated = validate::extract_rows(grid, &self.achievement_spec())?;
        let (registry, errors) =
            ingest::build_achievement_registry(validated, &self.config.achievement)?;
        self.achievement = Some(registry);
        self.cache = None;
        Ok(errors)
    }

    /// Validate and ingest the proctoring status sheet. Same replace /
    /// invalidate / report contract as [`Self::load_achievement`].
    pub fn load_proctoring(&mut self, grid: &SheetGrid) -> Result<Vec<String>, RosterError> {
        let validated = validate::extract_rows(grid, &self.proctoring_spec())?;
        let (registry, errors) =
            ingest::build_proctoring_registry(validated, &self.config.proctoring)?;
        self.proctoring = Some(registry);
        self.cache = None;
        Ok(errors)
    }

    /// Join the registries into the ordered roster.
    ///
    /// Requires both sheets to have been ingested. Repeat calls without an
    /// intervening ingestion return the cached result unchanged.
    pub fn reconcile(&mut self) -> Result<&RosterResult, RosterError> {
        if self.cache.is_some() {
            return Ok(self.cache.as_ref().unwrap());
        }

        let achievement = self.achievement.as_ref().ok_or(RosterError::NotEnoughData)?;
        let proctoring = self.proctoring.as_ref().ok_or(RosterError::NotEnoughData)?;

        let mut joined = Vec::with_capacity(achievement.len());
        let mut unmatched = Vec::new();
        for (email, student) in achievement {
            match proctoring.get(email) {
                Some(&passed) => {
                    let mut student = student.clone();
                    student.proctoring = Some(if passed {
                        ProctoringStatus::Passed
                    } else {
                        ProctoringStatus::Failed
                    });
                    let key = email_sort_key(email, &self.config.email)?;
                    joined.push((key, student, passed));
                }
                None => {
                    unmatched.push(email.clone());
                    if unmatched.len() > self.config.limits.max_unmatched_students {
                        return Err(RosterError::TooManyUnmatched { emails: unmatched });
                    }
                }
            }
        }

        // Registry iteration order is arbitrary; the numeric email id is
        // the published order. Ties fall back to the full email.
        joined.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.email.cmp(&b.1.email)));

        self.cache = Some(RosterResult {
            students: joined.into_iter().map(|(_, s, p)| (s, p)).collect(),
            unmatched,
        });
        Ok(self.cache.as_ref().unwrap())
    }

    /// Diagnostic side query: proctoring records with no achievement
    /// counterpart. Never fatal and never part of the roster.
    pub fn extra_proctoring_count(&self) -> usize {
        match (&self.achievement, &self.proctoring) {
            (Some(achievement), Some(proctoring)) => proctoring
                .keys()
                .filter(|email| !achievement.contains_key(*email))
                .count(),
            _ => 0,
        }
    }

    pub fn achievement_registry(&self) -> Option<&HashMap<String, Student>> {
        self.achievement.as_ref()
    }

    pub fn proctoring_registry(&self) -> Option<&HashMap<String, bool>> {
        self.proctoring.as_ref()
    }

    fn achievement_spec(&self) -> ValidationSpec<'_> {
        let a = &self.config.achievement;
        let mut required = vec![
            a.email_column.as_str(),
            a.last_name_column.as_str(),
            a.first_name_column.as_str(),
            a.second_name_column.as_str(),
            a.grade_column.as_str(),
        ];
        if let Some(ref control) = a.control_column {
            required.push(control.as_str());
        }
        ValidationSpec {
            required,
            significant: vec![a.email_column.as_str(), a.grade_column.as_str()],
            selection: a.selection.as_ref(),
            max_error_rows: a.max_error_rows,
        }
    }

    fn proctoring_spec(&self) -> ValidationSpec<'_> {
        let p = &self.config.proctoring;
        ValidationSpec {
            required: vec![p.email_column.as_str(), p.status_column.as_str()],
            significant: vec![p.email_column.as_str(), p.status_column.as_str()],
            selection: None,
            max_error_rows: p.max_error_rows,
        }
    }
}

/// Numeric id embedded in the expected `<prefix><digits>@...` local part.
fn email_sort_key(email: &str, config: &EmailConfig) -> Result<u64, RosterError> {
    let bad = || RosterError::UnexpectedEmailFormat {
        email: email.to_string(),
    };
    let local = email.strip_prefix(config.prefix.as_str()).ok_or_else(bad)?;
    let digits = local.get(..config.digits).ok_or_else(bad)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad());
    }
    if !local[config.digits..].starts_with('@') {
        return Err(bad());
    }
    digits.parse::<u64>().map_err(|_| bad())
}
