//! Presentation helpers shared by error details and the front end.
//! No pipeline logic lives here.

use crate::model::RosterResult;

/// How many error row numbers to show before eliding.
pub const ROW_DISPLAY_LIMIT: usize = 20;

/// How many student emails to show before eliding.
pub const EMAIL_DISPLAY_LIMIT: usize = 5;

/// Comma-joined identifier list, cut at `limit` with an ellipsis.
pub fn bounded_list(items: &[String], limit: usize) -> String {
    if items.len() <= limit {
        items.join(", ")
    } else {
        format!("{}, …", items[..limit].join(", "))
    }
}

/// One-line human summary of a reconciliation run.
pub fn roster_summary(result: &RosterResult) -> String {
    let passed = result.students.iter().filter(|(_, p)| *p).count();
    format!(
        "{} students — {} passed proctoring, {} failed, {} without proctoring data",
        result.students.len(),
        passed,
        result.students.len() - passed,
        result.unmatched.len(),
    )
}
