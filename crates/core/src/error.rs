use std::fmt;

use crate::report::{bounded_list, EMAIL_DISPLAY_LIMIT, ROW_DISPLAY_LIMIT};

/// Pipeline error. `Display` is the short user-facing message;
/// [`RosterError::detail`] carries the long form with the offending row
/// numbers or emails.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, equal tokens, etc.).
    ConfigValidation(String),
    /// A required header name has no match in row 1 of the sheet.
    MissingColumn { column: String },
    /// The stream is not a readable .xlsx workbook.
    IncorrectFileType,
    /// Upload guard: the file exceeds the configured size cap.
    FileTooLarge { size: u64, limit: u64 },
    /// Accumulated row errors crossed the allowed ceiling. Carries every
    /// identifier gathered up to the abort, in insertion order.
    TooManyErrorRows { rows: Vec<String> },
    /// The same student email appeared twice in one file.
    DuplicateStudent { email: String },
    /// Students without a proctoring match crossed the allowed ceiling.
    TooManyUnmatched { emails: Vec<String> },
    /// An email does not match the expected `st######@...` shape.
    UnexpectedEmailFormat { email: String },
    /// Reconcile was called before both files were ingested.
    NotEnoughData,
    /// IO error (file read, etc.).
    Io(String),
}

impl RosterError {
    /// Advanced message: the short message plus the offending identifiers,
    /// bounded to a display limit with an ellipsis.
    pub fn detail(&self) -> String {
        match self {
            Self::TooManyErrorRows { rows } => format!(
                "file rejected: more than {} rows contain errors, check rows {}",
                rows.len() - 1,
                bounded_list(rows, ROW_DISPLAY_LIMIT)
            ),
            Self::TooManyUnmatched { emails } => format!(
                "processing stopped: no proctoring data found for more than {} students: {}",
                emails.len() - 1,
                bounded_list(emails, EMAIL_DISPLAY_LIMIT)
            ),
            Self::UnexpectedEmailFormat { email } => format!(
                "unexpected email format: '{email}' does not match the expected student address shape"
            ),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => {
                write!(f, "required column '{column}' not found")
            }
            Self::IncorrectFileType => write!(f, "file is not a readable .xlsx workbook"),
            Self::FileTooLarge { size, limit } => {
                write!(f, "file is {size} bytes, the limit is {limit}")
            }
            Self::TooManyErrorRows { rows } => {
                write!(f, "file rejected: {} rows contain errors", rows.len())
            }
            Self::DuplicateStudent { email } => {
                write!(f, "student with email {email} found twice")
            }
            Self::TooManyUnmatched { emails } => write!(
                f,
                "processing stopped: no proctoring data found for {} students",
                emails.len()
            ),
            Self::UnexpectedEmailFormat { email } => {
                write!(f, "unexpected email format: '{email}'")
            }
            Self::NotEnoughData => write!(f, "not enough data: upload both files first"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for RosterError {}
