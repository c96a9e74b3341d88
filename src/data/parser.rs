use crate::error::LoadError;

/// How many leading rows are searched for the `x`/`y` header.
pub const HEADER_SCAN_ROWS: usize = 50;

/// Positions of the `x` and `y` columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XyColumns {
    pub x: usize,
    pub y: usize,
}

/// Decode file bytes as UTF-8, falling back to latin1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        // Each latin1 byte maps to the same Unicode code point
        e.into_bytes().iter().map(|&b| b as char).collect()
    })
}

/// Choose between `;` and `,` by which one splits the first non-blank line
/// into more fields. Ties go to `,`.
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

fn column_index(headers: &[String], wanted: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim() == wanted)
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(wanted)))
}

/// Locate the `x` and `y` columns in a header row. An exact match wins over
/// a case-insensitive one.
pub fn find_xy_columns(headers: &[String]) -> Result<XyColumns, LoadError> {
    let x = column_index(headers, "x").ok_or(LoadError::MissingColumn("x"))?;
    let y = column_index(headers, "y").ok_or(LoadError::MissingColumn("y"))?;
    Ok(XyColumns { x, y })
}

/// Find the header row among the first [`HEADER_SCAN_ROWS`] rows.
///
/// Returns the row index and its column positions. When no row names both
/// columns, the error reflects what the first row is missing.
pub fn find_header_row(rows: &[Vec<String>]) -> Result<(usize, XyColumns), LoadError> {
    let first = rows.first().ok_or(LoadError::NoData)?;
    for (i, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        if let Ok(columns) = find_xy_columns(row) {
            return Ok((i, columns));
        }
    }
    find_xy_columns(first).map(|columns| (0, columns))
}

/// Whether every cell of a row is blank.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}
