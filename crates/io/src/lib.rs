// Spreadsheet input for the roster pipeline

pub mod xlsx;

pub use xlsx::{read_workbook, read_workbook_from};
