use std::fs::File;
use std::io::Cursor;

use catalog_ingest::format::FormatKind;
use catalog_ingest::inference::{InferenceOptions, infer, infer_with_options};
use catalog_ingest::{IngestionError, SchemaError};

#[test]
fn first_line_becomes_properties_in_order() {
    let mut input = Cursor::new(b"a,b,c\n1,2,3\n".to_vec());
    let draft = infer(&mut input, "x.csv").unwrap();

    assert_eq!(draft.len(), 3);
    assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert!(draft.title.is_none());
    assert!(draft.schema_type.is_none());
    for p in &draft.properties {
        assert!(p.field_type.is_none());
        assert!(p.description.is_none());
    }
}

#[test]
fn header_without_trailing_newline() {
    let mut input = Cursor::new(b"a,b,c".to_vec());
    let draft = infer(&mut input, "x.csv").unwrap();
    assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn fixture_file_from_disk() {
    let mut file = File::open("tests/fixtures/street_trees.csv").unwrap();
    let draft = infer(&mut file, "street_trees.csv").unwrap();
    assert_eq!(
        draft.field_names().collect::<Vec<_>>(),
        vec!["tree_id", "species", "diameter_in", "planted_on"]
    );
}

#[test]
fn rows_are_not_validated() {
    // Ragged rows after the header are fine: only names are discovered.
    let mut input = Cursor::new(b"a,b\n1\n1,2,3,4\n".to_vec());
    let draft = infer(&mut input, "ragged.CSV").unwrap();
    assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn header_less_file_still_uses_first_line() {
    let mut input = Cursor::new(b"1,2,3\n4,5,6\n".to_vec());
    let draft = infer(&mut input, "numbers.csv").unwrap();
    assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["1", "2", "3"]);
}

#[test]
fn empty_file_is_a_schema_generation_error() {
    let mut input = Cursor::new(Vec::new());
    let err = infer(&mut input, "empty.csv").unwrap_err();
    match err {
        IngestionError::SchemaGeneration { format, source } => {
            assert_eq!(format, FormatKind::DelimitedText);
            assert!(matches!(source, SchemaError::Shape { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn undecodable_header_names_the_format() {
    let mut input = Cursor::new(b"ok,\xff\xfe\n".to_vec());
    let err = infer(&mut input, "latin1.csv").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("failed to generate schema from delimited-text file"), "{msg}");
}

#[test]
fn configurable_delimiter() {
    let mut input = Cursor::new(b"a\tb\n".to_vec());
    let opts = InferenceOptions { delimiter: b'\t' };
    let draft = infer_with_options(&mut input, "tabbed.csv", &opts).unwrap();
    assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn inference_is_repeatable_after_rewind() {
    let mut input = Cursor::new(b"x,y\n".to_vec());
    let first = infer(&mut input, "x.csv").unwrap();
    input.set_position(0);
    let second = infer(&mut input, "x.csv").unwrap();
    assert_eq!(first, second);
}

#[test]
fn leading_blank_line_does_not_promote_data_row() {
    let mut input = Cursor::new(b"\na,b\n".to_vec());
    let err = infer(&mut input, "x.csv").unwrap_err();
    match err {
        IngestionError::SchemaGeneration { format, source } => {
            assert_eq!(format, FormatKind::DelimitedText);
            assert!(matches!(source, SchemaError::Shape { .. }), "got {source:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
