//! Merge command implementation

use crate::error::CliError;
use crate::input::FileReader;
use anyhow::{Context, Result};
use clap::Args;
use dntmark_core::corpus::merge_line;
use dntmark_core::CorpusReader;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the merge command
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Tagged source sentences
    #[arg(short, long, value_name = "FILE")]
    pub source: PathBuf,

    /// Tagged target sentences
    #[arg(short, long, value_name = "FILE")]
    pub target: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl MergeArgs {
    /// Execute the merge command
    pub fn execute(&self) -> Result<()> {
        let writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };
        let reader =
            CorpusReader::new(FileReader::open(&self.source)?, FileReader::open(&self.target)?);
        let written = write_merged(reader, writer)?;
        log::info!("merged {written} pairs");
        Ok(())
    }
}

/// Write one aligner line per pair, returning the pair count
pub fn write_merged<R: io::BufRead, W: Write>(
    reader: CorpusReader<R>,
    mut writer: W,
) -> Result<usize> {
    let mut written = 0;
    for record in reader {
        let record = record.map_err(|e| CliError::ProcessingError(e.to_string()))?;
        writeln!(writer, "{}", merge_line(&record.source, &record.target))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
