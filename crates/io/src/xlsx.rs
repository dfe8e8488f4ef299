//! Reads a report export into a [`SheetGrid`].
//!
//! Only the first worksheet is used; the platform exports single-sheet
//! workbooks. Cells are flattened to the strings the engine validates.

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Xlsx};

use rollcall_core::{RosterError, SheetGrid};

/// Open a workbook from disk. `max_bytes` is the upload size cap, checked
/// before any decoding.
pub fn read_workbook(path: &Path, max_bytes: u64) -> Result<SheetGrid, RosterError> {
    let size = std::fs::metadata(path)
        .map_err(|e| RosterError::Io(e.to_string()))?
        .len();
    if size > max_bytes {
        return Err(RosterError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut workbook = open_workbook_auto(path).map_err(|_| RosterError::IncorrectFileType)?;
    first_sheet_grid(&mut workbook)
}

/// Open a workbook from any seekable stream (an upload buffer, usually).
/// The caller is expected to have applied the size cap to the stream.
pub fn read_workbook_from<RS: Read + Seek>(reader: RS) -> Result<SheetGrid, RosterError> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader).map_err(|_| RosterError::IncorrectFileType)?;
    first_sheet_grid(&mut workbook)
}

fn first_sheet_grid<RS, R>(workbook: &mut R) -> Result<SheetGrid, RosterError>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    let sheet_names = workbook.sheet_names().to_vec();
    let first = match sheet_names.first() {
        Some(name) => name.clone(),
        None => return Err(RosterError::IncorrectFileType),
    };
    let range = workbook
        .worksheet_range(&first)
        .map_err(|_| RosterError::IncorrectFileType)?;

    // The range starts at the first occupied cell, not at A1. Pad leading
    // rows so grid numbering matches the sheet's own; a workbook whose
    // header is not in row 1 must fail column resolution, not shift it.
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(range.height() + start_row as usize);
    for _ in 0..start_row {
        rows.push(Vec::new());
    }
    for row in range.rows() {
        rows.push(row.iter().map(cell_to_string).collect());
    }

    let mut rows = rows.into_iter();
    let headers = rows.next().unwrap_or_default();
    Ok(SheetGrid::new(headers, rows.collect()))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        // Date cells surface as their serial value; the pipeline has no
        // date-typed columns, so this only shows up in error reports.
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Integral floats print without a trailing ".0" so an id cell like 42
/// round-trips as "42".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
