//! Configuration module

use anyhow::{Context, Result};
use dntmark_core::config::defaults;
use dntmark_core::{ClassPolicy, EngineConfigBuilder, LinkingStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CliConfig {
    /// Linking configuration
    #[serde(default)]
    pub linking: LinkingConfig,

    /// Random sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Linking-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LinkingConfig {
    /// Strategy; inferred from the presence of an alignment file when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<LinkingStrategy>,

    /// Anchor class policy
    pub class_policy: ClassPolicy,

    /// Target language code, used for low-resource and diacritic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,

    /// Run the residual single-token pass
    pub residual_pass: bool,

    /// Span token-count ratio guard
    pub max_span_ratio: usize,

    /// Density gate threshold
    pub density_threshold: f64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            strategy: None,
            class_policy: ClassPolicy::default(),
            target_language: None,
            residual_pass: true,
            max_span_ratio: defaults::MAX_SPAN_RATIO,
            density_threshold: defaults::DENSITY_THRESHOLD,
        }
    }
}

/// Sampling-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Primary acceptance probability
    pub link_probability: f64,

    /// Target-to-source acceptance probability (alignment-free only)
    pub reverse_link_probability: f64,

    /// Residual pass acceptance probability
    pub residual_probability: f64,

    /// Marker duplication probability
    pub augment_probability: f64,

    /// Lower bound of the placeholder range
    pub pool_floor: usize,

    /// Base seed (unset = random)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            link_probability: 1.0,
            reverse_link_probability: 1.0,
            residual_probability: defaults::RESIDUAL_PROBABILITY,
            augment_probability: 0.0,
            pool_floor: defaults::POOL_FLOOR,
            seed: None,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Summary format: "text" or "json"
    pub format: String,

    /// Re-glue punctuation in rebuilt sentences
    pub normalize_punctuation: bool,

    /// Pairs read per processing batch
    pub batch_size: usize,

    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            normalize_punctuation: true,
            batch_size: 10_000,
            worker_threads: 0,
        }
    }
}

impl CliConfig {
    /// Load a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Seed an engine builder with the file's settings
    pub fn engine_builder(&self) -> EngineConfigBuilder {
        let linking = &self.linking;
        let sampling = &self.sampling;
        let mut builder = EngineConfigBuilder::new()
            .class_policy(linking.class_policy)
            .residual_pass(linking.residual_pass)
            .max_span_ratio(linking.max_span_ratio)
            .density_threshold(linking.density_threshold)
            .link_probability(sampling.link_probability)
            .reverse_link_probability(sampling.reverse_link_probability)
            .residual_probability(sampling.residual_probability)
            .augment_probability(sampling.augment_probability)
            .pool_floor(sampling.pool_floor)
            .normalize_punctuation(self.output.normalize_punctuation);
        if let Some(strategy) = linking.strategy {
            builder = builder.strategy(strategy);
        }
        if let Some(seed) = sampling.seed {
            builder = builder.seed(seed);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[linking]
strategy = "alignment-free"
class_policy = "exact"

[sampling]
seed = 42
"#
        )
        .unwrap();

        let config = CliConfig::from_file(file.path()).unwrap();
        assert_eq!(config.linking.strategy, Some(LinkingStrategy::AlignmentFree));
        assert_eq!(config.linking.class_policy, ClassPolicy::Exact);
        assert!(config.linking.residual_pass);
        assert_eq!(config.sampling.seed, Some(42));
        assert_eq!(config.sampling.pool_floor, 25);
        assert_eq!(config.output.format, "text");

        let engine = config.engine_builder().build().unwrap();
        assert_eq!(engine.strategy, LinkingStrategy::AlignmentFree);
        assert_eq!(engine.seed, Some(42));
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = CliConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[linking]"));
        assert!(text.contains("[sampling]"));
        assert!(text.contains("[output]"));
        assert_eq!(toml::from_str::<CliConfig>(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[linking\nstrategy = ").unwrap();
        let err = CliConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
