/// A worksheet flattened to raw cell strings: header row plus data rows.
///
/// Row numbering follows the source sheet, 1-based: the header is row 1 and
/// the first data row is row 2. An empty string is a blank cell. Ragged rows
/// read as blank past their end, so extractors need not pad.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Literal match of `name` against the header row. First hit wins.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows (the header is not a data row).
    pub fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at 0-based data-row `index` and 0-based column `col`.
    pub fn cell(&self, index: usize, col: usize) -> &str {
        self.rows
            .get(index)
            .and_then(|row| row.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Sheet row number of the last physical row (1 when there is no data).
    pub fn last_row_number(&self) -> u32 {
        self.rows.len() as u32 + 1
    }
}
