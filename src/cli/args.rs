//! Command line argument parsing for the flatobject CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::index::IndexOptions;

/// flatobject - flatten JSON objects into index entries
#[derive(Parser, Debug, Clone)]
#[command(name = "flatobject")]
#[command(about = "Flatten schema-less JSON objects into index entries")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct FlatObjectArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=debug, 3=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl FlatObjectArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }

    /// Log filter matching the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the entries produced for each field value
    Flatten(FieldArgs),

    /// Index every field value in memory and print index statistics
    Stats(FieldArgs),
}

/// Field definition and input shared by all commands.
///
/// Each JSON value of the input is one value of the field.
#[derive(Parser, Debug, Clone)]
pub struct FieldArgs {
    /// Name of the flat-object field
    #[arg(long, value_name = "NAME")]
    pub field: String,

    /// Field mapping parameters file (JSON)
    #[arg(short, long, value_name = "MAPPING_FILE")]
    pub mapping: Option<PathBuf>,

    /// Don't produce posting entries
    #[arg(long)]
    pub no_index: bool,

    /// Don't produce column entries
    #[arg(long)]
    pub no_doc_values: bool,

    /// Text indexed in place of null leaves
    #[arg(long, value_name = "TEXT")]
    pub null_value: Option<String>,

    /// What posting entries record: docs or freqs
    #[arg(long, value_name = "OPTIONS")]
    pub index_options: Option<IndexOptions>,

    /// Don't index bare leaf values under the field itself
    #[arg(long)]
    pub no_root_values: bool,

    /// Input file with JSON values, one per line (default: stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_command() {
        let args = FlatObjectArgs::try_parse_from([
            "flatobject",
            "flatten",
            "--field",
            "attrs",
            "--no-doc-values",
            "--null-value",
            "NULL",
            "docs.jsonl",
        ])
        .unwrap();

        if let Command::Flatten(field_args) = args.command {
            assert_eq!(field_args.field, "attrs");
            assert!(field_args.no_doc_values);
            assert!(!field_args.no_index);
            assert_eq!(field_args.null_value.as_deref(), Some("NULL"));
            assert_eq!(field_args.input, Some(PathBuf::from("docs.jsonl")));
        } else {
            panic!("Expected Flatten command");
        }
    }

    #[test]
    fn test_stats_command_requires_field() {
        assert!(FlatObjectArgs::try_parse_from(["flatobject", "stats"]).is_err());

        let args =
            FlatObjectArgs::try_parse_from(["flatobject", "stats", "--field", "f", "-m", "m.json"])
                .unwrap();
        if let Command::Stats(field_args) = args.command {
            assert_eq!(field_args.mapping, Some(PathBuf::from("m.json")));
            assert!(field_args.input.is_none());
        } else {
            panic!("Expected Stats command");
        }
    }

    #[test]
    fn test_index_options_flag() {
        let args = FlatObjectArgs::try_parse_from([
            "flatobject",
            "stats",
            "--field",
            "f",
            "--index-options",
            "freqs",
        ])
        .unwrap();
        if let Command::Stats(field_args) = args.command {
            assert_eq!(field_args.index_options, Some(IndexOptions::Freqs));
        } else {
            panic!("Expected Stats command");
        }

        let err = FlatObjectArgs::try_parse_from([
            "flatobject",
            "stats",
            "--field",
            "f",
            "--index-options",
            "positions",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("accepted values are [docs, freqs]"));
    }

    #[test]
    fn test_verbosity_levels() {
        let args = FlatObjectArgs::try_parse_from(["flatobject", "stats", "--field", "f"]).unwrap();
        assert_eq!(args.verbosity(), 1);
        assert_eq!(args.log_level(), "warn");

        let args =
            FlatObjectArgs::try_parse_from(["flatobject", "-vv", "stats", "--field", "f"]).unwrap();
        assert_eq!(args.log_level(), "debug");

        let args = FlatObjectArgs::try_parse_from(["flatobject", "-q", "-vvv", "stats", "--field", "f"])
            .unwrap();
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn test_output_format() {
        let args =
            FlatObjectArgs::try_parse_from(["flatobject", "--format", "json", "stats", "--field", "f"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
