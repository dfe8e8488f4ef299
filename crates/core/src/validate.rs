//! Row validation: classifies each data row as usable, erroneous, or
//! fully blank before any registry is built.

use crate::config::SelectionConfig;
use crate::error::RosterError;
use crate::sheet::SheetGrid;

/// What to extract from a sheet and how strictly.
pub struct ValidationSpec<'a> {
    /// Column names to pull, in output order.
    pub required: Vec<&'a str>,
    /// Subset of `required` whose emptiness makes a row an error.
    pub significant: Vec<&'a str>,
    /// Cohort filter; rows failing it are skipped, not counted.
    pub selection: Option<&'a SelectionConfig>,
    /// Error ceiling; crossing it aborts with the full accumulated list.
    pub max_error_rows: usize,
}

/// One usable data row: required-column values plus its sheet row number.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
    pub values: Vec<String>,
    pub row: u32,
}

/// Validation output. `error_rows` keeps accumulating through ingestion,
/// so both stages share one ceiling.
#[derive(Debug, Default)]
pub struct ValidatedSheet {
    pub rows: Vec<ValidRow>,
    pub error_rows: Vec<String>,
}

/// Classify every data row of `grid` against `spec`.
///
/// A row with all significant cells present is usable. A row missing a
/// significant cell, but not blank across every required cell, is an error.
/// Fully blank rows are buffered as a candidate run: an interior run is
/// flushed into the error list (isolated blank rows imply damaged data),
/// while the run that reaches the physical end of the sheet is dropped as
/// end-of-data padding.
pub fn extract_rows(
    grid: &SheetGrid,
    spec: &ValidationSpec<'_>,
) -> Result<ValidatedSheet, RosterError> {
    let positions = resolve_columns(grid, &spec.required)?;
    let significant: Vec<bool> = spec
        .required
        .iter()
        .map(|name| spec.significant.contains(name))
        .collect();
    let selection = match spec.selection {
        Some(sel) => Some((
            resolve_columns(grid, &[sel.column.as_str()])?[0],
            sel.contains.to_lowercase(),
        )),
        None => None,
    };

    let mut out = ValidatedSheet::default();
    let mut run_start: u32 = 0;
    let mut run_len: u32 = 0;
    let last_row = grid.last_row_number();

    for index in 0..grid.data_row_count() {
        let row_number = index as u32 + 2;

        if let Some((pos, ref needle)) = selection {
            if !grid.cell(index, pos).to_lowercase().contains(needle.as_str()) {
                continue;
            }
        }

        let mut values = Vec::with_capacity(positions.len());
        let mut missing_significant = false;
        let mut fully_blank = true;
        for (&pos, &is_significant) in positions.iter().zip(&significant) {
            let cell = grid.cell(index, pos);
            if cell.is_empty() {
                if is_significant {
                    missing_significant = true;
                }
            } else {
                fully_blank = false;
            }
            values.push(cell.to_string());
        }

        if !missing_significant {
            out.rows.push(ValidRow { values, row: row_number });
        } else if !fully_blank {
            if note_error(&mut out.error_rows, row_number, spec.max_error_rows) {
                return Err(RosterError::TooManyErrorRows { rows: out.error_rows });
            }
        } else if run_start + run_len == row_number {
            run_len += 1;
        } else {
            // A new blank run begins; the previous one was interior.
            if flush_blank_run(&mut out.error_rows, run_start, run_len, spec.max_error_rows) {
                return Err(RosterError::TooManyErrorRows { rows: out.error_rows });
            }
            run_start = row_number;
            run_len = 1;
        }
    }

    // A final run that stops short of the sheet's physical end is interior
    // damage; one that reaches it is padding.
    if run_len > 0 && run_start + run_len - 1 != last_row {
        if flush_blank_run(&mut out.error_rows, run_start, run_len, spec.max_error_rows) {
            return Err(RosterError::TooManyErrorRows { rows: out.error_rows });
        }
    }

    Ok(out)
}

/// Match each name literally against header row 1. The first name with no
/// match is a fatal configuration error, distinct from any row error.
fn resolve_columns(grid: &SheetGrid, names: &[&str]) -> Result<Vec<usize>, RosterError> {
    names
        .iter()
        .map(|name| {
            grid.column_position(name)
                .ok_or_else(|| RosterError::MissingColumn {
                    column: (*name).to_string(),
                })
        })
        .collect()
}

/// Append one error row number. True when the ceiling is now crossed.
pub(crate) fn note_error(errors: &mut Vec<String>, row: u32, ceiling: usize) -> bool {
    errors.push(row.to_string());
    errors.len() > ceiling
}

fn flush_blank_run(errors: &mut Vec<String>, start: u32, len: u32, ceiling: usize) -> bool {
    for row in start..start + len {
        if note_error(errors, row, ceiling) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(headers: &[&str], rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn spec<'a>(significant: Vec<&'a str>, max_error_rows: usize) -> ValidationSpec<'a> {
        ValidationSpec {
            required: vec!["Email", "Score"],
            significant,
            selection: None,
            max_error_rows,
        }
    }

    #[test]
    fn usable_rows_carry_their_sheet_row_number() {
        let grid = grid(
            &["Email", "Score"],
            &[&["a@x", "0.9"], &["b@x", "0.5"]],
        );
        let out = extract_rows(&grid, &spec(vec!["Email", "Score"], 10)).unwrap();
        assert_eq!(out.error_rows.len(), 0);
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[0].row, 2);
        assert_eq!(out.rows[1].row, 3);
        assert_eq!(out.rows[0].values, vec!["a@x".to_string(), "0.9".to_string()]);
    }

    #[test]
    fn missing_column_is_fatal_and_names_the_column() {
        let grid = grid(&["Email"], &[&["a@x"]]);
        let err = extract_rows(&grid, &spec(vec!["Email"], 10)).unwrap_err();
        assert_eq!(
            err,
            RosterError::MissingColumn { column: "Score".into() }
        );
    }

    #[test]
    fn blank_significant_cell_is_a_row_error() {
        let grid = grid(
            &["Email", "Score"],
            &[&["a@x", "0.9"], &["b@x", ""], &["c@x", "0.7"]],
        );
        let out = extract_rows(&grid, &spec(vec!["Email", "Score"], 10)).unwrap();
        assert_eq!(out.error_rows, vec!["3".to_string()]);
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn blank_insignificant_cell_is_tolerated() {
        let grid = grid(
            &["Email", "Score"],
            &[&["a@x", ""], &["", "0.5"]],
        );
        // Only Email is significant: row 2 usable with a blank score,
        // row 3 erroneous.
        let out = extract_rows(&grid, &spec(vec!["Email"], 10)).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].values[1], "");
        assert_eq!(out.error_rows, vec!["3".to_string()]);
    }

    #[test]
    fn trailing_blank_rows_are_padding() {
        let grid = grid(
            &["Email", "Score"],
            &[
                &["a@x", "0.9"],
                &["b@x", "0.5"],
                &["", ""],
                &["", ""],
                &["", ""],
            ],
        );
        let out = extract_rows(&grid, &spec(vec!["Email", "Score"], 10)).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.error_rows.len(), 0);
    }

    #[test]
    fn interior_blank_row_is_an_error() {
        let grid = grid(
            &["Email", "Score"],
            &[&["a@x", "0.9"], &["", ""], &["b@x", "0.5"]],
        );
        let out = extract_rows(&grid, &spec(vec!["Email", "Score"], 10)).unwrap();
        assert_eq!(out.error_rows, vec!["3".to_string()]);
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn interior_run_before_trailing_run_is_flushed() {
        let grid = grid(
            &["Email", "Score"],
            &[
                &["a@x", "0.9"],
                &["", ""],
                &["", ""],
                &["b@x", "0.5"],
                &["", ""],
            ],
        );
        let out = extract_rows(&grid, &spec(vec!["Email", "Score"], 10)).unwrap();
        // Rows 3-4 are interior damage, row 6 reaches the end of the sheet.
        assert_eq!(out.error_rows, vec!["3".to_string(), "4".to_string()]);
    }

    #[test]
    fn ceiling_crossing_aborts_with_the_full_list() {
        let grid = grid(
            &["Email", "Score"],
            &[&["a@x", ""], &["b@x", ""], &["c@x", ""]],
        );
        let err = extract_rows(&grid, &spec(vec!["Email", "Score"], 2)).unwrap_err();
        match err {
            RosterError::TooManyErrorRows { rows } => {
                assert_eq!(rows, vec!["2".to_string(), "3".to_string(), "4".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ceiling_boundary_is_inclusive() {
        let grid = grid(
            &["Email", "Score"],
            &[&["a@x", ""], &["b@x", ""]],
        );
        let out = extract_rows(&grid, &spec(vec!["Email", "Score"], 2)).unwrap();
        assert_eq!(out.error_rows.len(), 2);
    }

    #[test]
    fn selection_skips_rows_without_counting_them() {
        let selection = SelectionConfig {
            column: "Cohort Name".into(),
            contains: "mathmech".into(),
        };
        let grid = grid(
            &["Email", "Score", "Cohort Name"],
            &[
                &["a@x", "0.9", "MathMech 2023"],
                &["b@x", "", "physics"],
                &["c@x", "0.7", "mathmech"],
            ],
        );
        let spec = ValidationSpec {
            required: vec!["Email", "Score"],
            significant: vec!["Email", "Score"],
            selection: Some(&selection),
            max_error_rows: 0,
        };
        // Row 3 has a blank score but belongs to another cohort, so it is
        // skipped rather than reported; the match is case-insensitive.
        let out = extract_rows(&grid, &spec).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.error_rows.len(), 0);
    }

    #[test]
    fn selection_on_a_missing_column_is_fatal() {
        let selection = SelectionConfig {
            column: "Cohort Name".into(),
            contains: "mathmech".into(),
        };
        let grid = grid(&["Email", "Score"], &[&["a@x", "0.9"]]);
        let spec = ValidationSpec {
            required: vec!["Email", "Score"],
            significant: vec!["Email"],
            selection: Some(&selection),
            max_error_rows: 10,
        };
        let err = extract_rows(&grid, &spec).unwrap_err();
        assert_eq!(
            err,
            RosterError::MissingColumn { column: "Cohort Name".into() }
        );
    }
}
