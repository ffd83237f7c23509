//! Delimited-text field discovery.

use std::io::{BufRead, BufReader, Read};

use crate::error::SchemaError;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Read the first line of a delimited-text source and return its cells as field names.
///
/// Rules:
///
/// - The first line is always treated as the header; header-less files are not detected.
/// - Cells are split on `delimiter`, honouring double quotes, left to right.
/// - Names are trimmed of surrounding whitespace; a leading UTF-8 byte order mark is dropped.
/// - A blank first line is an error, even when later lines hold data.
pub fn field_names<R: Read>(reader: R, delimiter: u8) -> Result<Vec<String>, SchemaError> {
    let mut line = Vec::new();
    if BufReader::new(reader).read_until(b'\n', &mut line)? == 0 {
        return Err(SchemaError::shape("file is empty (no header row)"));
    }
    let line = line.strip_prefix(UTF8_BOM).unwrap_or(&line[..]);
    if line.trim_ascii().is_empty() {
        return Err(SchemaError::shape("first line is blank (no header row)"));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(line);

    let mut header = csv::StringRecord::new();
    if !rdr.read_record(&mut header)? {
        return Err(SchemaError::shape("first line is blank (no header row)"));
    }

    Ok(header.iter().map(|cell| cell.trim().to_string()).collect())
}
