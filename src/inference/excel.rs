#![cfg(feature = "excel")]

use std::io::{Read, Seek};

use calamine::{Data, Range, Reader, Xlsx};

use crate::error::SchemaError;

/// Discover field names from an `.xlsx` workbook.
///
/// Behavior:
/// - Uses the first sheet in the workbook's declared order; other sheets are ignored
/// - Reads row 1 of that sheet from column A up to its last non-empty cell
/// - Renders each cell as text; empty cells inside that span become empty names
pub fn field_names<RS: Read + Seek>(reader: RS) -> Result<Vec<String>, SchemaError> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader)?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SchemaError::shape("workbook has no sheets"))?;
    let range = workbook.worksheet_range(&sheet)?;

    header_row(&sheet, &range)
}

fn header_row(sheet: &str, range: &Range<Data>) -> Result<Vec<String>, SchemaError> {
    let empty_row = || SchemaError::shape(format!("first row of sheet '{sheet}' is empty"));

    // Range coordinates are absolute; a range that starts below row 1 means row 1 is blank.
    let (start_row, start_col) = match range.start() {
        Some(start) if !range.is_empty() => start,
        _ => return Err(SchemaError::shape(format!("sheet '{sheet}' is empty"))),
    };
    if start_row > 0 {
        return Err(empty_row());
    }
    let first = range.rows().next().ok_or_else(empty_row)?;

    let mut names: Vec<String> = vec![String::new(); start_col as usize];
    names.extend(first.iter().map(cell_to_header_string));

    while names.last().is_some_and(|n| n.is_empty()) {
        names.pop();
    }
    if names.is_empty() {
        return Err(empty_row());
    }
    Ok(names)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        _ => c.to_string().trim().to_string(),
    }
}
