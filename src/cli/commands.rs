//! Command implementations for the flatobject CLI.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use serde_json::value::RawValue;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::cursor::TokenCursor;
use crate::cursor::json::JsonTokenCursor;
use crate::error::FlatObjectError;
use crate::index::entry::IndexableEntry;
use crate::index::{IndexWriter, MemoryIndex};
use crate::mapper::{FlatObjectFieldMapper, FlatObjectMapping, ParseContext};

/// Execute a CLI command, writing its output to stdout.
pub fn execute_command(args: FlatObjectArgs) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &args.command {
        Command::Flatten(field_args) => {
            let input = read_input(field_args.input.as_deref())?;
            flatten(field_args, &input, &args, &mut out)
        }
        Command::Stats(field_args) => {
            let input = read_input(field_args.input.as_deref())?;
            stats(field_args, &input, &args, &mut out)
        }
    }
}

/// Flatten every value of `input` and write the entries.
pub fn flatten<W: Write>(
    field_args: &FieldArgs,
    input: &str,
    cli_args: &FlatObjectArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let field = build_field(field_args)?;

    let mut values = Vec::new();
    for_each_value(&field, input, |number, entries| {
        values.push(FlattenedValue {
            value: number,
            entries: entries.iter().map(EntryOutput::from).collect(),
        });
        Ok(())
    })?;

    let result = FlattenResult {
        field: field.name().to_string(),
        values,
    };
    write_flatten(out, &result, cli_args)
}

/// Index every value of `input` in memory and write the index statistics.
pub fn stats<W: Write>(
    field_args: &FieldArgs,
    input: &str,
    cli_args: &FlatObjectArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let field = build_field(field_args)?;

    let mut index = MemoryIndex::new();
    for (name, options) in field.indexed_fields() {
        index.register_field(name, options);
    }

    for_each_value(&field, input, |_, entries| {
        index.add_document(entries)?;
        Ok(())
    })?;

    info!("indexed {} documents", index.doc_count());
    write_stats(out, &index.stats(), cli_args)
}

/// Build the field mapper from the mapping file, then apply flag overrides.
fn build_field(args: &FieldArgs) -> anyhow::Result<FlatObjectFieldMapper> {
    let mut mapping = match &args.mapping {
        Some(path) => load_mapping(&args.field, path)?,
        None => FlatObjectMapping::default(),
    };

    if args.no_index {
        mapping.index = false;
    }
    if args.no_doc_values {
        mapping.doc_values = false;
    }
    if args.no_root_values {
        mapping.index_leaf_values_into_root = false;
    }
    if let Some(index_options) = args.index_options {
        mapping.index_options = index_options;
    }
    if args.null_value.is_some() {
        mapping.null_value = args.null_value.clone();
    }

    Ok(FlatObjectFieldMapper::new(args.field.as_str(), mapping)?)
}

fn load_mapping(field: &str, path: &Path) -> anyhow::Result<FlatObjectMapping> {
    debug!("loading mapping for [{field}] from {}", path.display());
    let text = fs::read_to_string(path)
        .map_err(FlatObjectError::from)
        .with_context(|| format!("Failed to read mapping file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(FlatObjectError::from)
        .with_context(|| format!("Failed to parse mapping file {}", path.display()))?;
    Ok(FlatObjectMapping::from_value(field, value)?)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(FlatObjectError::from)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(FlatObjectError::from)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Parse each JSON value of `input` as one value of `field`.
///
/// Values may be separated by newlines (JSON lines) or any other whitespace,
/// and a single value may span several lines. Value numbers start at 1.
fn for_each_value<F>(field: &FlatObjectFieldMapper, input: &str, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(usize, Vec<IndexableEntry>) -> anyhow::Result<()>,
{
    let stream = serde_json::Deserializer::from_str(input).into_iter::<Box<RawValue>>();
    for (i, raw) in stream.enumerate() {
        let number = i + 1;
        let raw = raw.with_context(|| format!("Invalid JSON in value {number}"))?;
        let entries = parse_value(field, raw.get())
            .with_context(|| format!("Failed to flatten value {number}"))?;
        f(number, entries)?;
    }
    Ok(())
}

fn parse_value(field: &FlatObjectFieldMapper, text: &str) -> crate::error::Result<Vec<IndexableEntry>> {
    let mut cursor = JsonTokenCursor::start(text)?;
    let mut ctx = ParseContext::new();
    field.parse(&mut cursor, &mut ctx)?;
    cursor.next_token()?;
    Ok(ctx.into_entries())
}
