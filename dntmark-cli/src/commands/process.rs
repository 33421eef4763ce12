//! Process command implementation

use crate::commands::{init_logging, load_tag_config};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::FileReader;
use crate::output::{CorpusWriter, ReportFormat};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use dntmark_core::{
    ClassPolicy, CorpusReader, LinkingStrategy, PairProcessor, PairRecord, RunSummary,
};
use std::io;
use std::path::PathBuf;

/// Arguments for the process command
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Tagged source sentences (JSON Lines of [word, tag] pairs)
    #[arg(short, long, value_name = "FILE")]
    pub source: PathBuf,

    /// Tagged target sentences (JSON Lines of [word, tag] pairs)
    #[arg(short, long, value_name = "FILE")]
    pub target: PathBuf,

    /// Word alignment, one `i-j` line per pair; selects alignment-based linking
    #[arg(short, long, value_name = "FILE")]
    pub alignment: Option<PathBuf>,

    /// Untokenized source text emitted ahead of each rewritten line
    #[arg(long, value_name = "FILE", requires = "original_target")]
    pub original_source: Option<PathBuf>,

    /// Untokenized target text emitted ahead of each rewritten line
    #[arg(long, value_name = "FILE", requires = "original_source")]
    pub original_target: Option<PathBuf>,

    /// Output prefix; writes PREFIX.src, PREFIX.trg, PREFIX.log.jsonl and PREFIX.discarded
    #[arg(short, long, value_name = "PREFIX")]
    pub output: PathBuf,

    /// Target language code
    #[arg(long, value_name = "CODE")]
    pub target_lang: Option<String>,

    /// Linking strategy (default: inferred from --alignment)
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Anchor class policy
    #[arg(long, value_enum)]
    pub class_policy: Option<Policy>,

    /// Per-entity acceptance probability
    #[arg(short, long, value_name = "P")]
    pub probability: Option<f64>,

    /// Target-to-source acceptance probability (alignment-free only)
    #[arg(long, value_name = "P")]
    pub reverse_probability: Option<f64>,

    /// Residual single-token pass acceptance probability
    #[arg(long, value_name = "P")]
    pub residual_probability: Option<f64>,

    /// Marker duplication probability
    #[arg(long, value_name = "P")]
    pub augment_probability: Option<f64>,

    /// Skip the residual single-token pass
    #[arg(long)]
    pub no_residual: bool,

    /// Base seed for reproducible runs
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Number of worker threads (0 = all cores)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Pairs read per processing batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Summary format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Run configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tag configuration file (default: embedded)
    #[arg(long, value_name = "FILE")]
    pub tag_config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Linking strategy names
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Follow the word alignment
    AlignmentBased,
    /// Match identical normalized subsequences
    AlignmentFree,
}

impl From<Strategy> for LinkingStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::AlignmentBased => LinkingStrategy::AlignmentBased,
            Strategy::AlignmentFree => LinkingStrategy::AlignmentFree,
        }
    }
}

/// Anchor class policy names
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Policy {
    /// Classes must be identical
    Exact,
    /// Identical, or either class is a wildcard class
    Wildcard,
    /// No class check
    Unchecked,
}

impl From<Policy> for ClassPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Exact => ClassPolicy::Exact,
            Policy::Wildcard => ClassPolicy::Wildcard,
            Policy::Unchecked => ClassPolicy::Unchecked,
        }
    }
}

impl ProcessArgs {
    /// Execute the process command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        log::info!("Starting corpus processing");
        log::debug!("Arguments: {:?}", self);

        let file_config = match &self.config {
            Some(path) => CliConfig::from_file(path)?,
            None => CliConfig::default(),
        };
        let format = self.report_format(&file_config)?;
        let processor = self.build_processor(&file_config)?;
        let strategy = processor.config().strategy;

        let mut reader =
            CorpusReader::new(FileReader::open(&self.source)?, FileReader::open(&self.target)?);
        match (&self.alignment, strategy) {
            (Some(path), LinkingStrategy::AlignmentBased) => {
                reader = reader.with_alignment(FileReader::open(path)?);
            }
            (Some(path), LinkingStrategy::AlignmentFree) => {
                log::warn!(
                    "alignment-free linking ignores alignment file {}",
                    path.display()
                );
            }
            (None, _) => {}
        }
        if let (Some(source), Some(target)) = (&self.original_source, &self.original_target) {
            reader = reader.with_originals(FileReader::open(source)?, FileReader::open(target)?);
        }
        log::info!(
            "source file: {} bytes",
            FileReader::file_size(&self.source)?
        );

        let threads = match self.threads.unwrap_or(file_config.output.worker_threads) {
            0 => num_cpus::get(),
            n => n,
        };
        let batch_size = self
            .batch_size
            .unwrap_or(file_config.output.batch_size)
            .max(1);

        let mut writer = CorpusWriter::create(&self.output)?;
        let mut summary = RunSummary::default();
        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_pairs();

        let mut batch = Vec::with_capacity(batch_size);
        for record in reader {
            let record = record.map_err(|e| CliError::ProcessingError(e.to_string()))?;
            batch.push(record);
            if batch.len() == batch_size {
                self.flush_batch(&processor, &mut batch, threads, &mut writer, &mut summary)?;
                progress.pairs_completed(batch_size, summary.discarded);
            }
        }
        let remaining = batch.len();
        self.flush_batch(&processor, &mut batch, threads, &mut writer, &mut summary)?;
        progress.pairs_completed(remaining, summary.discarded);

        writer.finish()?;
        progress.finish();
        log::info!(
            "processed {} pairs, {} discarded",
            summary.pairs,
            summary.discarded
        );

        let mut formatter = format.formatter(io::stdout());
        formatter.format_summary(&summary, processor.seed())?;
        formatter.finish()?;

        Ok(())
    }

    /// Process and write one batch, leaving it empty
    fn flush_batch(
        &self,
        processor: &PairProcessor,
        batch: &mut Vec<PairRecord>,
        threads: usize,
        writer: &mut CorpusWriter,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let outcomes = processor
            .process_batch(batch.as_slice(), threads)
            .context("Failed to start worker threads")?;
        for outcome in &outcomes {
            writer.write(outcome)?;
            summary.record(outcome);
        }
        batch.clear();
        Ok(())
    }

    fn report_format(&self, file_config: &CliConfig) -> Result<ReportFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => ReportFormat::from_name(&file_config.output.format).ok_or_else(|| {
                CliError::ConfigError(format!(
                    "unknown output format '{}'",
                    file_config.output.format
                ))
                .into()
            }),
        }
    }

    /// Strategy in effect: flag, then config file, then presence of an alignment file
    fn resolve_strategy(&self, file_config: &CliConfig) -> Result<LinkingStrategy> {
        let strategy = self
            .strategy
            .map(LinkingStrategy::from)
            .or(file_config.linking.strategy)
            .unwrap_or(if self.alignment.is_some() {
                LinkingStrategy::AlignmentBased
            } else {
                LinkingStrategy::AlignmentFree
            });

        if strategy == LinkingStrategy::AlignmentBased && self.alignment.is_none() {
            return Err(CliError::ConfigError(
                "alignment-based linking requires --alignment".to_string(),
            )
            .into());
        }
        Ok(strategy)
    }

    fn build_processor(&self, file_config: &CliConfig) -> Result<PairProcessor> {
        let tags = load_tag_config(self.tag_config.as_deref())?;
        let mut builder = file_config
            .engine_builder()
            .strategy(self.resolve_strategy(file_config)?);

        if let Some(policy) = self.class_policy {
            builder = builder.class_policy(policy.into());
        }
        if let Some(p) = self.probability {
            builder = builder.link_probability(p);
        }
        if let Some(p) = self.reverse_probability {
            builder = builder.reverse_link_probability(p);
        }
        if let Some(p) = self.residual_probability {
            builder = builder.residual_probability(p);
        }
        if let Some(p) = self.augment_probability {
            builder = builder.augment_probability(p);
        }
        if self.no_residual {
            builder = builder.residual_pass(false);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(code) = self
            .target_lang
            .as_deref()
            .or(file_config.linking.target_language.as_deref())
        {
            builder = builder.target_language(code, &tags);
        }

        let config = builder
            .build()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;
        PairProcessor::new(config, &tags).map_err(|e| CliError::ConfigError(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: ProcessArgs,
    }

    fn parse(extra: &[&str]) -> ProcessArgs {
        let mut argv = vec!["dntmark", "-s", "a.jsonl", "-t", "b.jsonl", "-o", "out"];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_strategy_inferred_from_alignment() {
        let config = CliConfig::default();
        assert_eq!(
            parse(&[]).resolve_strategy(&config).unwrap(),
            LinkingStrategy::AlignmentFree
        );
        assert_eq!(
            parse(&["-a", "align.txt"]).resolve_strategy(&config).unwrap(),
            LinkingStrategy::AlignmentBased
        );
    }

    #[test]
    fn test_alignment_based_without_alignment_is_rejected() {
        let err = parse(&["--strategy", "alignment-based"])
            .resolve_strategy(&CliConfig::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ConfigError(_))
        ));
    }

    #[test]
    fn test_flags_override_file_config() {
        let mut file_config = CliConfig::default();
        file_config.sampling.seed = Some(1);
        file_config.sampling.residual_probability = 0.9;

        let processor = parse(&["--seed", "77", "--no-residual", "--target-lang", "tir"])
            .build_processor(&file_config)
            .unwrap();
        assert_eq!(processor.seed(), 77);
        assert!(!processor.config().residual_pass);
        assert_eq!(processor.config().residual_probability, 0.9);
        assert_eq!(
            processor.config().single_token,
            dntmark_core::SingleTokenPolicy::FirstLink
        );
    }

    #[test]
    fn test_out_of_range_probability_is_config_error() {
        let err = parse(&["-p", "1.5"])
            .build_processor(&CliConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("link_probability"));
    }

    #[test]
    fn test_originals_must_come_together() {
        let result = Harness::try_parse_from([
            "dntmark",
            "-s",
            "a",
            "-t",
            "b",
            "-o",
            "out",
            "--original-source",
            "a.txt",
        ]);
        assert!(result.is_err());
    }
}
