//! Rewritten corpus files

use anyhow::{Context, Result};
use dntmark_core::{Correspondence, PairOutcome, PairStatus};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One correspondence log record
#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    index: usize,
    correspondences: Vec<LogEntry<'a>>,
}

/// A correspondence with its `[class][text] -> [class][text]` rendering
#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    line: String,
    #[serde(flatten)]
    link: &'a Correspondence,
}

/// Writes the four outputs of a `process` run
///
/// With prefix `out`: `out.src`, `out.trg`, `out.log.jsonl` (pairs with at
/// least one correspondence) and `out.discarded` (one index per line).
pub struct CorpusWriter {
    source: BufWriter<File>,
    target: BufWriter<File>,
    log: BufWriter<File>,
    discarded: BufWriter<File>,
}

impl CorpusWriter {
    /// Output paths for a prefix, in `(src, trg, log, discarded)` order
    pub fn paths(prefix: &Path) -> [PathBuf; 4] {
        let with = |suffix: &str| {
            let mut name = prefix.as_os_str().to_owned();
            name.push(suffix);
            PathBuf::from(name)
        };
        [
            with(".src"),
            with(".trg"),
            with(".log.jsonl"),
            with(".discarded"),
        ]
    }

    /// Create the output files, truncating existing ones
    pub fn create(prefix: &Path) -> Result<Self> {
        let [source, target, log, discarded] = Self::paths(prefix);
        let open = |path: &Path| -> Result<BufWriter<File>> {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(BufWriter::new(file))
        };
        Ok(Self {
            source: open(&source)?,
            target: open(&target)?,
            log: open(&log)?,
            discarded: open(&discarded)?,
        })
    }

    /// Write one pair's lines and log entries
    pub fn write(&mut self, outcome: &PairOutcome) -> Result<()> {
        let (source_lines, target_lines) = outcome.output_lines();
        for line in source_lines {
            writeln!(self.source, "{line}")?;
        }
        for line in target_lines {
            writeln!(self.target, "{line}")?;
        }

        if !outcome.correspondences.is_empty() {
            let record = LogRecord {
                index: outcome.index,
                correspondences: outcome
                    .correspondences
                    .iter()
                    .map(|link| LogEntry {
                        line: link.to_string(),
                        link,
                    })
                    .collect(),
            };
            serde_json::to_writer(&mut self.log, &record)?;
            writeln!(self.log)?;
        }

        if outcome.status == PairStatus::Discarded {
            writeln!(self.discarded, "{}", outcome.index)?;
        }
        Ok(())
    }

    /// Flush every output
    pub fn finish(mut self) -> Result<()> {
        self.source.flush()?;
        self.target.flush()?;
        self.log.flush()?;
        self.discarded.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dntmark_core::LinkKind;
    use std::fs;
    use tempfile::TempDir;

    fn outcome(index: usize, status: PairStatus, correspondences: Vec<Correspondence>) -> PairOutcome {
        PairOutcome {
            index,
            source: format!("source {index}"),
            target: format!("target {index}"),
            correspondences,
            status,
            placeholders: 0,
            duplicated: 0,
            originals: None,
        }
    }

    #[test]
    fn test_paths_append_suffixes() {
        let [src, trg, log, discarded] = CorpusWriter::paths(Path::new("out/train"));
        assert_eq!(src, PathBuf::from("out/train.src"));
        assert_eq!(trg, PathBuf::from("out/train.trg"));
        assert_eq!(log, PathBuf::from("out/train.log.jsonl"));
        assert_eq!(discarded, PathBuf::from("out/train.discarded"));
    }

    #[test]
    fn test_writes_all_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let prefix = temp_dir.path().join("run");
        let link = Correspondence {
            kind: LinkKind::AlignedToken,
            placeholder: 7,
            source_class: "GPE".into(),
            source_text: "Rome".into(),
            target_class: "GPE".into(),
            target_text: "Roma".into(),
        };

        let mut writer = CorpusWriter::create(&prefix).unwrap();
        writer
            .write(&outcome(0, PairStatus::Substituted, vec![link]))
            .unwrap();
        writer
            .write(&outcome(1, PairStatus::Discarded, Vec::new()))
            .unwrap();
        writer.finish().unwrap();

        let [src, trg, log, discarded] = CorpusWriter::paths(&prefix);
        assert_eq!(fs::read_to_string(src).unwrap(), "source 0\nsource 1\n");
        assert_eq!(fs::read_to_string(trg).unwrap(), "target 0\ntarget 1\n");
        assert_eq!(fs::read_to_string(discarded).unwrap(), "1\n");

        let log = fs::read_to_string(log).unwrap();
        let record: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
        assert_eq!(record["index"], 0);
        assert_eq!(record["correspondences"][0]["placeholder"], 7);
        assert_eq!(record["correspondences"][0]["kind"], "aligned-token");
        assert_eq!(
            record["correspondences"][0]["line"],
            "[GPE][Rome] -> [GPE][Roma]"
        );
    }
}
