//! Count command implementation

use crate::error::CliError;
use crate::input::FileReader;
use crate::output::ReportFormat;
use anyhow::{Context, Result};
use clap::Args;
use dntmark_core::PlaceholderCounts;
use std::io;
use std::path::{Path, PathBuf};

/// Arguments for the count command
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Rewritten source file
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Rewritten target file
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,
}

impl CountArgs {
    /// Execute the count command; fails when the two sides disagree
    pub fn execute(&self) -> Result<()> {
        let source = count_file(&self.source)?;
        let target = count_file(&self.target)?;

        let mut formatter = self
            .format
            .unwrap_or(ReportFormat::Text)
            .formatter(io::stdout());
        formatter.format_counts(&source, &target)?;
        formatter.finish()?;

        verify(&source, &target)
    }
}

fn count_file(path: &Path) -> Result<PlaceholderCounts> {
    PlaceholderCounts::from_reader(FileReader::open(path)?)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Check line counts and marker multisets agree
pub fn verify(source: &PlaceholderCounts, target: &PlaceholderCounts) -> Result<()> {
    if source.lines != target.lines {
        return Err(CliError::PlaceholderMismatch(format!(
            "{} source lines vs {} target lines",
            source.lines, target.lines
        ))
        .into());
    }

    let differences = source.differences(target);
    if let Some((id, here, there)) = differences.first() {
        return Err(CliError::PlaceholderMismatch(format!(
            "{} identifiers differ, first ${{DNT0}}{id}: {here} in source, {there} in target",
            differences.len()
        ))
        .into());
    }
    Ok(())
}
