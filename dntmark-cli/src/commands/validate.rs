//! Validate command implementation

use crate::config::CliConfig;
use anyhow::Result;
use clap::Args;
use dntmark_core::TagConfig;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("file").required(true).multiple(true)))]
pub struct ValidateArgs {
    /// Tag configuration file to validate
    #[arg(long, value_name = "FILE", group = "file")]
    pub tag_config: Option<PathBuf>,

    /// Run configuration file to validate
    #[arg(short, long, value_name = "FILE", group = "file")]
    pub config: Option<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        if let Some(path) = &self.tag_config {
            println!("Validating tag configuration: {}", path.display());
            match TagConfig::from_file(path) {
                Ok(config) => {
                    println!("✓ Configuration is valid!");
                    println!("  Name: {}", config.metadata.name);
                    println!("  Admitted classes: {}", config.tags.admitted.join(" "));
                    println!("  Wildcard classes: {}", config.tags.wildcard.join(" "));
                    println!("  Stopwords: {}", config.stop_words().len());
                }
                Err(e) => {
                    println!("✗ Configuration is invalid!");
                    println!("  Error: {e}");
                    return Err(anyhow::anyhow!("Validation failed: {}", e));
                }
            }
        }

        if let Some(path) = &self.config {
            println!("Validating run configuration: {}", path.display());
            match CliConfig::from_file(path)
                .and_then(|config| Ok(config.engine_builder().build()?))
            {
                Ok(engine) => {
                    println!("✓ Configuration is valid!");
                    println!("  Class policy: {:?}", engine.class_policy);
                    println!("  Link probability: {}", engine.link_probability);
                }
                Err(e) => {
                    println!("✗ Configuration is invalid!");
                    println!("  Error: {e:#}");
                    return Err(anyhow::anyhow!("Validation failed: {:#}", e));
                }
            }
        }

        Ok(())
    }
}
