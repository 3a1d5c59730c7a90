//! A1 notation helpers.

/// Column name for a 1-based column index: 1 → `A`, 26 → `Z`, 27 → `AA`.
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Top-left cell of a write starting at the 1-based sheet row.
pub fn start_cell(sheet: &str, row: usize) -> String {
    format!("{}!A{}", quote_sheet(sheet), row)
}

/// Full rectangle covered by `rows` × `columns` values starting at `row`.
pub fn block_range(sheet: &str, row: usize, rows: usize, columns: usize) -> String {
    format!(
        "{}!A{}:{}{}",
        quote_sheet(sheet),
        row,
        column_letter(columns.max(1)),
        row + rows.saturating_sub(1)
    )
}

/// Sheet names with anything but letters, digits and underscores must be
/// single-quoted, with embedded quotes doubled.
fn quote_sheet(sheet: &str) -> String {
    if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}
