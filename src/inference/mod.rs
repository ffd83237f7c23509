//! Schema inference: discover field names from buffered bytes and wrap them in a
//! [`SchemaDraft`].
//!
//! Exactly one extractor runs per file, chosen by [`FormatKind::detect`] on the declared file
//! name:
//!
//! - [`csv`]: first line of a delimited-text file, split on the delimiter
//! - [`json`]: distinct keys across every record of a JSON array, in first-seen order
//! - [`excel`]: first row of the first worksheet (requires the Cargo feature `excel`)
//!
//! Extractors only discover names. Row-level data is never validated.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;

use std::io::{Read, Seek};

use crate::error::{IngestionError, IngestionResult, SchemaError};
use crate::format::FormatKind;
use crate::types::SchemaDraft;

/// Options controlling inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Field separator for delimited text.
    pub delimiter: u8,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Infer a schema draft from `reader`, choosing the extractor from `file_name`.
///
/// Unsupported file names fail with a [`IngestionError::SchemaGeneration`] before `reader` is
/// touched.
///
/// ```
/// use std::io::Cursor;
///
/// use catalog_ingest::inference::infer;
///
/// let mut upload = Cursor::new(b"id,species,dbh\n1,Acer,12\n".to_vec());
/// let draft = infer(&mut upload, "street_trees.csv").unwrap();
/// assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["id", "species", "dbh"]);
/// ```
pub fn infer<R: Read + Seek>(reader: &mut R, file_name: &str) -> IngestionResult<SchemaDraft> {
    infer_with_options(reader, file_name, &InferenceOptions::default())
}

/// Like [`infer`], with explicit options.
pub fn infer_with_options<R: Read + Seek>(
    reader: &mut R,
    file_name: &str,
    options: &InferenceOptions,
) -> IngestionResult<SchemaDraft> {
    let format = FormatKind::detect(file_name);
    let names = match format {
        FormatKind::DelimitedText => csv::field_names(reader, options.delimiter),
        FormatKind::Json => json::field_names(reader),
        FormatKind::Spreadsheet => spreadsheet_field_names(reader),
        FormatKind::Unsupported => Err(SchemaError::UnsupportedFileType),
    }
    .map_err(|source| IngestionError::SchemaGeneration { format, source })?;

    Ok(SchemaDraft::from_field_names(names))
}

fn spreadsheet_field_names<R: Read + Seek>(reader: &mut R) -> Result<Vec<String>, SchemaError> {
    // Avoid unused warnings when the feature is off.
    let _ = &reader;

    #[cfg(feature = "excel")]
    {
        excel::field_names(reader)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(SchemaError::FeatureDisabled {
            format: FormatKind::Spreadsheet,
            feature: "excel",
        })
    }
}
