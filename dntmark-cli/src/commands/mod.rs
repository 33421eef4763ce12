//! CLI command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use dntmark_core::{default_tag_config, TagConfig};
use std::borrow::Cow;
use std::path::Path;

pub mod count;
pub mod generate_config;
pub mod merge;
pub mod process;
pub mod shuffle;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Substitute do-not-translate placeholders into a tagged parallel corpus
    Process(process::ProcessArgs),

    /// Compare placeholder counts of two rewritten files
    Count(count::CountArgs),

    /// Write `source ||| target` lines for a word aligner
    Merge(merge::MergeArgs),

    /// Shuffle two parallel files jointly
    Shuffle(shuffle::ShuffleArgs),

    /// Write a configuration template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Validate a tag or run configuration file
    Validate(validate::ValidateArgs),
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Process(args) => args.execute(),
            Commands::Count(args) => args.execute(),
            Commands::Merge(args) => args.execute(),
            Commands::Shuffle(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
        }
    }
}

/// The tag configuration at `path`, or the embedded default
pub(crate) fn load_tag_config(path: Option<&Path>) -> Result<Cow<'static, TagConfig>> {
    match path {
        Some(path) => {
            let config = TagConfig::from_file(path)
                .with_context(|| format!("Failed to load tag config: {}", path.display()))?;
            Ok(Cow::Owned(config))
        }
        None => Ok(Cow::Borrowed(default_tag_config())),
    }
}

/// Initialize logging based on verbosity level
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if !quiet {
        // A logger may already be installed when commands run in-process
        let env = env_logger::Env::default().default_filter_or(log_level);
        let _ = env_logger::Builder::from_env(env).try_init();
    }
}
