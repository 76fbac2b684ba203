use std::fs;

use clap::Parser;
use flatobject::cli::{FlatObjectArgs, FlattenResult, execute_command, flatten, stats};
use flatobject::cli::args::Command;
use flatobject::error::FlatObjectError;
use flatobject::index::{IndexOptions, IndexWriter, MemoryIndex};
use flatobject::mapper::{DocumentMapper, FIELD_NAMES_FIELD};

use tempfile::tempdir;

const MAPPING: &str = r#"{
    "properties": {
        "attrs": { "type": "flat", "null_value": "NULL" },
        "labels": { "type": "flat", "doc_values": false, "index_options": "freqs" },
        "hidden": { "type": "flat", "index": false, "doc_values": false }
    }
}"#;

fn build_index(documents: &[&str]) -> (DocumentMapper, MemoryIndex) {
    let mapper = DocumentMapper::from_json(MAPPING).unwrap();
    let mut index = MemoryIndex::new();
    mapper.register_fields(&mut index);

    for result in mapper.parse_batch(documents) {
        index.add_document(result.unwrap()).unwrap();
    }
    (mapper, index)
}

#[test]
fn test_index_documents_end_to_end() {
    let (_, index) = build_index(&[
        r#"{"id": 1, "attrs": {"user": {"id": "123", "name": "Ann"}}, "labels": ["a", "a"]}"#,
        r#"{"id": 2, "attrs": {"user": {"id": "456", "name": "Ann"}, "gone": null}}"#,
        r#"{"id": 3, "hidden": {"secret": "x"}, "labels": ["b"]}"#,
    ]);

    assert_eq!(index.doc_count(), 3);

    // Value and path=value lookups.
    assert_eq!(index.term_docs("attrs", b"Ann"), vec![0, 1]);
    assert_eq!(index.term_docs("attrs-content", b"user.id\x07456"), vec![1]);
    assert_eq!(index.term_docs("attrs-content", b"gone\x07NULL"), vec![1]);

    // Sorted-set doc values dedupe and sort per document.
    let values = index.doc_values("attrs", 0).unwrap();
    assert_eq!(values, vec![&b"123"[..], &b"Ann"[..]]);
    assert!(index.doc_values("attrs", 2).is_none());

    // Frequencies only for fields indexed with freqs.
    let labels = index.postings("labels", b"a").unwrap();
    assert_eq!(labels.postings[0].frequency, 2);
    let ann = index.postings("attrs", b"Ann").unwrap();
    assert!(ann.postings.iter().all(|p| p.frequency == 1));

    // Fields without doc values are recorded in the field names field.
    assert_eq!(index.term_docs(FIELD_NAMES_FIELD, b"labels"), vec![0, 2]);

    // Neither indexed nor stored: nothing at all.
    assert!(index.postings("hidden", b"x").is_none());
    assert!(!index.stats().fields.contains_key("hidden-content"));
}

#[test]
fn test_failed_document_produces_no_entries() {
    let mapper = DocumentMapper::from_json(MAPPING).unwrap();
    let results = mapper.parse_batch(&[
        r#"{"attrs": {"ok": "1"}}"#,
        r#"{"attrs": {"ok": "1", "bad\u0007key": "2"}}"#,
        r#"{"attrs": "scalar"}"#,
        r#"{"attrs": {"ok": "1"}"#,
    ]);

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(FlatObjectError::InvalidKey(_))));
    assert!(matches!(results[2], Err(FlatObjectError::Structural { .. })));
    assert!(matches!(results[3], Err(FlatObjectError::Parse { .. })));
}

#[test]
fn test_mapping_update() {
    let mut mapper = DocumentMapper::from_json(MAPPING).unwrap();
    mapper
        .put_mapping(
            r#"{"properties": {"attrs": {"type": "flat", "null_value": "NULL", "meta": {"owner": "search"}}}}"#,
        )
        .unwrap();
    assert_eq!(
        mapper.field("attrs").unwrap().field_type().meta().get("owner").map(String::as_str),
        Some("search")
    );

    let err = mapper
        .put_mapping(r#"{"properties": {"labels": {"type": "flat", "doc_values": false, "index_options": "docs"}}}"#)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mapping error: Mapper for [labels] conflicts with existing mapper:\n\tCannot update parameter [index_options] from [freqs] to [docs]"
    );
    assert_eq!(
        mapper.field("labels").unwrap().field_type().index_options(),
        Some(IndexOptions::Freqs)
    );
}

#[test]
fn test_cli_reads_files() {
    let dir = tempdir().unwrap();
    let mapping_path = dir.path().join("mapping.json");
    let input_path = dir.path().join("values.jsonl");
    fs::write(&mapping_path, r#"{"doc_values": false, "null_value": "none"}"#).unwrap();
    fs::write(&input_path, "{\"a\": null}\n{\"b\": [1, 2]}\n").unwrap();

    let args = FlatObjectArgs::try_parse_from([
        "flatobject",
        "--format",
        "json",
        "flatten",
        "--field",
        "f",
        "--mapping",
        mapping_path.to_str().unwrap(),
        "--no-root-values",
        input_path.to_str().unwrap(),
    ])
    .unwrap();

    let Command::Flatten(field_args) = &args.command else {
        panic!("Expected Flatten command");
    };
    let input = fs::read_to_string(&input_path).unwrap();
    let mut out = Vec::new();
    flatten(field_args, &input, &args, &mut out).unwrap();

    let result: FlattenResult = serde_json::from_slice(&out).unwrap();
    let payloads: Vec<Vec<&str>> = result
        .values
        .iter()
        .map(|v| v.entries.iter().map(|e| e.payload.as_str()).collect())
        .collect();
    assert_eq!(
        payloads,
        vec![
            vec!["a\\u{7}none", "f"],
            vec!["b\\u{7}1", "b\\u{7}2", "f"],
        ]
    );

    let mut out = Vec::new();
    stats(field_args, &input, &args, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["total_documents"], 2);
    assert_eq!(value["fields"]["f-content"]["unique_terms"], 3);
}

#[test]
fn test_cli_missing_input_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.jsonl");
    let args = FlatObjectArgs::try_parse_from([
        "flatobject",
        "flatten",
        "--field",
        "f",
        missing.to_str().unwrap(),
    ])
    .unwrap();

    let err = execute_command(args).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read input file"));
    assert!(matches!(
        err.downcast_ref::<FlatObjectError>(),
        Some(FlatObjectError::Io(_))
    ));
}

#[test]
fn test_cli_invalid_mapping_file() {
    let dir = tempdir().unwrap();
    let mapping_path = dir.path().join("mapping.json");
    fs::write(&mapping_path, r#"{"doc_values": fal"#).unwrap();

    let args = FlatObjectArgs::try_parse_from([
        "flatobject",
        "flatten",
        "--field",
        "f",
        "--mapping",
        mapping_path.to_str().unwrap(),
    ])
    .unwrap();
    let Command::Flatten(field_args) = &args.command else {
        panic!("Expected Flatten command");
    };

    let mut out = Vec::new();
    let err = flatten(field_args, "{}", &args, &mut out).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse mapping file"));
    assert!(matches!(
        err.downcast_ref::<FlatObjectError>(),
        Some(FlatObjectError::Json(_))
    ));
    assert!(out.is_empty());
}
