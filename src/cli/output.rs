//! Output formatting for CLI commands.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cli::args::{FlatObjectArgs, OutputFormat};
use crate::index::entry::{EntryKind, IndexableEntry};
use crate::index::memory::IndexStats;

/// One entry as printed by the CLI. The payload is rendered with escapes so
/// the key/value separator stays visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOutput {
    pub field: String,
    pub kind: EntryKind,
    pub payload: String,
}

impl From<&IndexableEntry> for EntryOutput {
    fn from(entry: &IndexableEntry) -> Self {
        EntryOutput {
            field: entry.field_name.clone(),
            kind: entry.kind,
            payload: String::from_utf8_lossy(&entry.payload)
                .escape_debug()
                .to_string(),
        }
    }
}

/// Entries produced for one input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedValue {
    pub value: usize,
    pub entries: Vec<EntryOutput>,
}

/// Result of the `flatten` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenResult {
    pub field: String,
    pub values: Vec<FlattenedValue>,
}

impl FlattenResult {
    pub fn total_entries(&self) -> usize {
        self.values.iter().map(|v| v.entries.len()).sum()
    }
}

/// Write a flatten result in the requested format.
pub fn write_flatten<W: Write>(
    out: &mut W,
    result: &FlattenResult,
    args: &FlatObjectArgs,
) -> anyhow::Result<()> {
    match args.output_format {
        OutputFormat::Json => write_json(out, result, args),
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                writeln!(
                    out,
                    "Field [{}]: {} values, {} entries",
                    result.field,
                    result.values.len(),
                    result.total_entries()
                )?;
            }
            for value in &result.values {
                writeln!(out)?;
                writeln!(out, "Value {}:", value.value)?;
                for entry in &value.entries {
                    writeln!(
                        out,
                        "  {:<8} {:<24} {}",
                        entry.kind.to_string(),
                        entry.field,
                        entry.payload
                    )?;
                }
            }
            Ok(())
        }
    }
}

/// Write index statistics in the requested format.
pub fn write_stats<W: Write>(
    out: &mut W,
    stats: &IndexStats,
    args: &FlatObjectArgs,
) -> anyhow::Result<()> {
    match args.output_format {
        OutputFormat::Json => write_json(out, stats, args),
        OutputFormat::Human => {
            writeln!(out, "Index Statistics:")?;
            writeln!(out, "════════════════")?;
            writeln!(out, "Total documents: {}", stats.total_documents)?;

            for (field_name, field) in &stats.fields {
                writeln!(out)?;
                writeln!(out, "Field: {field_name}")?;
                writeln!(out, "  Unique terms: {}", field.unique_terms)?;
                writeln!(out, "  Postings: {}", field.total_postings)?;
                writeln!(out, "  Docs with values: {}", field.docs_with_values)?;
                writeln!(out, "  Unique values: {}", field.unique_values)?;
            }
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    result: &T,
    args: &FlatObjectArgs,
) -> anyhow::Result<()> {
    if args.pretty {
        serde_json::to_writer_pretty(&mut *out, result)?;
    } else {
        serde_json::to_writer(&mut *out, result)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(format: &str) -> FlatObjectArgs {
        FlatObjectArgs::try_parse_from(["flatobject", "-f", format, "flatten", "--field", "f"])
            .unwrap()
    }

    fn sample() -> FlattenResult {
        FlattenResult {
            field: "f".to_string(),
            values: vec![FlattenedValue {
                value: 1,
                entries: vec![EntryOutput::from(&IndexableEntry::posting(
                    "f-content",
                    "a\u{7}1",
                ))],
            }],
        }
    }

    #[test]
    fn test_entry_output_escapes_separator() {
        let output = EntryOutput::from(&IndexableEntry::column("f-content", "a\u{7}1"));
        assert_eq!(output.payload, "a\\u{7}1");
        assert_eq!(output.kind, EntryKind::Column);
    }

    #[test]
    fn test_write_flatten_json() {
        let mut out = Vec::new();
        write_flatten(&mut out, &sample(), &args("json")).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["field"], "f");
        assert_eq!(value["values"][0]["entries"][0]["kind"], "posting");
        assert_eq!(value["values"][0]["entries"][0]["payload"], "a\\u{7}1");
    }

    #[test]
    fn test_write_flatten_human() {
        let mut out = Vec::new();
        write_flatten(&mut out, &sample(), &args("human")).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Field [f]: 1 values, 1 entries"));
        assert!(text.contains("Value 1:"));
        assert!(text.contains("f-content"));
    }
}
