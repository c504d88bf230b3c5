//! HireSight - OEWS occupation queries from the command line
//!
//! Resolves each OEWS table from a local spreadsheet, a remote URL or the
//! bundled demo sample, then prints query results as text or JSON.

mod cli;

use clap::Parser;
use hiresight::{logging, OewsStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let store = OewsStore::global();
    match cli::run_command(store, cli.command, cli.format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
