//! File format detection from a declared file name.

use std::fmt;

/// Extensions accepted anywhere in the pipeline, lowercase and with the leading dot.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".csv", ".xlsx", ".json"];

/// The format a schema is inferred from.
///
/// Derived purely from the file name's extension (case-insensitive); the bytes are never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Comma-separated values (`.csv`).
    DelimitedText,
    /// A JSON array of objects (`.json`).
    Json,
    /// An Office Open XML workbook (`.xlsx`).
    Spreadsheet,
    /// Anything else.
    Unsupported,
}

impl FormatKind {
    /// Detect the format from a file name, URL path, or full URL.
    ///
    /// ```
    /// use catalog_ingest::format::FormatKind;
    ///
    /// assert_eq!(FormatKind::detect("Budget_2019.XLSX"), FormatKind::Spreadsheet);
    /// assert_eq!(FormatKind::detect("notes.txt"), FormatKind::Unsupported);
    /// ```
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Self::DelimitedText
        } else if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".xlsx") {
            Self::Spreadsheet
        } else {
            Self::Unsupported
        }
    }

    /// Returns `false` only for [`FormatKind::Unsupported`].
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Stable label used in error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::DelimitedText => "delimited-text",
            Self::Json => "json",
            Self::Spreadsheet => "spreadsheet",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
