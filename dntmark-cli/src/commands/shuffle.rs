//! Shuffle command implementation

use crate::error::CliError;
use crate::input::FileReader;
use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Arguments for the shuffle command
#[derive(Debug, Args)]
pub struct ShuffleArgs {
    /// Source side, one sentence per line
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Target side, one sentence per line
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output prefix; writes PREFIX.src and PREFIX.trg
    #[arg(short, long, value_name = "PREFIX")]
    pub output: PathBuf,

    /// Seed for a reproducible order
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

impl ShuffleArgs {
    /// Execute the shuffle command
    pub fn execute(&self) -> Result<()> {
        let source = FileReader::read_lines(&self.source)?;
        let target = FileReader::read_lines(&self.target)?;
        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());

        let pairs = shuffle_pairs(source, target, seed)?;

        let mut name = self.output.as_os_str().to_owned();
        name.push(".src");
        let source_path = PathBuf::from(name);
        let mut name = self.output.as_os_str().to_owned();
        name.push(".trg");
        let target_path = PathBuf::from(name);

        write_lines(&source_path, pairs.iter().map(|(s, _)| s.as_str()))?;
        write_lines(&target_path, pairs.iter().map(|(_, t)| t.as_str()))?;
        log::info!("shuffled {} pairs with seed {seed}", pairs.len());
        Ok(())
    }
}

/// Shuffle two parallel line lists with the same permutation
pub fn shuffle_pairs(
    source: Vec<String>,
    target: Vec<String>,
    seed: u64,
) -> Result<Vec<(String, String)>> {
    if source.len() != target.len() {
        return Err(CliError::ProcessingError(format!(
            "{} source lines vs {} target lines",
            source.len(),
            target.len()
        ))
        .into());
    }

    let mut pairs: Vec<(String, String)> = source.into_iter().zip(target).collect();
    pairs.shuffle(&mut StdRng::seed_from_u64(seed));
    Ok(pairs)
}

fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
