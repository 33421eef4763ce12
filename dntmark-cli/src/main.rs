//! dntmark command-line entry point

use anyhow::Result;
use clap::Parser;
use dntmark_cli::commands::Commands;

/// Do-not-translate placeholder substitution for tagged parallel corpora
#[derive(Debug, Parser)]
#[command(name = "dntmark", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    Cli::parse().command.execute()
}
