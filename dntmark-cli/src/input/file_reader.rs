//! File reading utilities

use crate::error::CliError;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Buffered, line-oriented access to corpus files
pub struct FileReader;

impl FileReader {
    /// Open a file for buffered line reading
    pub fn open(path: &Path) -> Result<BufReader<File>> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        Ok(BufReader::new(file))
    }

    /// Read every line of a file
    pub fn read_lines(path: &Path) -> Result<Vec<String>> {
        Self::open(path)?
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Get file size in bytes
    pub fn file_size(path: &Path) -> Result<u64> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        Ok(metadata.len())
    }
}
