//! Generate config command implementation

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use dntmark_core::config::DEFAULT_TAG_CONFIG_TOML;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Write the tag configuration (classes, languages, stopwords) instead of a run configuration
    #[arg(long)]
    pub tags: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        let kind = if self.tags { "tag" } else { "run" };
        println!("Generating {kind} configuration template...");
        println!("  Output file: {}", self.output.display());

        let template = self.generate_template()?;
        std::fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the configuration file");
        println!("2. Validate your configuration:");
        if self.tags {
            println!("   dntmark validate --tag-config {}", self.output.display());
            println!("3. Use it for processing:");
            println!(
                "   dntmark process -s src.jsonl -t trg.jsonl -o out --tag-config {}",
                self.output.display()
            );
        } else {
            println!("   dntmark validate --config {}", self.output.display());
            println!("3. Use it for processing:");
            println!(
                "   dntmark process -s src.jsonl -t trg.jsonl -o out --config {}",
                self.output.display()
            );
        }

        Ok(())
    }

    /// Generate template configuration content
    fn generate_template(&self) -> Result<String> {
        if self.tags {
            return Ok(DEFAULT_TAG_CONFIG_TOML.to_string());
        }
        let body = CliConfig::default().to_toml()?;
        Ok(format!(
            "# dntmark run configuration\n\
             #\n\
             # Command-line flags override these values. Leave [linking] strategy\n\
             # unset to pick it from the presence of an alignment file.\n\n{body}"
        ))
    }
}
