//! flatobject CLI binary.

use std::process;

use clap::Parser;
use flatobject::cli::{args::*, commands::*};

fn main() {
    let args = FlatObjectArgs::parse();

    // RUST_LOG still wins over the verbosity flags.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
