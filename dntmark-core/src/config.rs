//! Engine and tag configuration

use crate::error::{CoreError, Result};
use crate::lexical::StopWords;
use crate::tags::{ClassPolicy, TagSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Default configuration constants
pub mod defaults {
    /// Lower bound of the placeholder identifier range
    pub const POOL_FLOOR: usize = 25;

    /// Identifier range for duplicated markers
    pub const AUGMENT_RANGE: usize = 50;

    /// Span growth accepts a neighbour below this edit distance
    pub const GROWTH_DISTANCE: usize = 6;

    /// Single-token candidates of another class accepted below this distance
    pub const SINGLE_TOKEN_DISTANCE: usize = 3;

    /// Token-count ratio at which two spans stop being plausible
    pub const MAX_SPAN_RATIO: usize = 3;

    /// Placeholders per remaining content word above which a pair is discarded
    pub const DENSITY_THRESHOLD: f64 = 0.5;

    /// Acceptance probability of the residual single-token pass
    pub const RESIDUAL_PROBABILITY: f64 = 0.3;
}

/// How candidate correspondences are found, chosen once per corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkingStrategy {
    /// Follow a precomputed word alignment
    #[default]
    AlignmentBased,
    /// Search for identical normalized subsequences in both directions
    AlignmentFree,
}

/// Rule for growing a target span past its aligned anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanGrowth {
    /// Only `I-` tags extend the span
    TagContinuation,
    /// `I-` tags, or a previous word within `max_distance` (exclusive) of
    /// the matching source word
    TagOrSimilarity {
        /// Exclusive edit-distance bound
        max_distance: usize,
    },
}

impl Default for SpanGrowth {
    fn default() -> Self {
        SpanGrowth::TagOrSimilarity {
            max_distance: defaults::GROWTH_DISTANCE,
        }
    }
}

/// Candidate selection for single-token entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingleTokenPolicy {
    /// Among aligned words of the same class, or within `max_distance`
    /// (exclusive), take the lexically closest
    Closest {
        /// Exclusive edit-distance bound for words of another class
        max_distance: usize,
    },
    /// Take the first aligned word, ignoring tags (low-resource targets)
    FirstLink,
}

impl Default for SingleTokenPolicy {
    fn default() -> Self {
        SingleTokenPolicy::Closest {
            max_distance: defaults::SINGLE_TOKEN_DISTANCE,
        }
    }
}

/// Knobs of the substitution engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Primary linking strategy
    pub strategy: LinkingStrategy,
    /// Anchor class agreement policy
    pub class_policy: ClassPolicy,
    /// Target span growth rule
    pub growth: SpanGrowth,
    /// Single-token candidate selection
    pub single_token: SingleTokenPolicy,
    /// Per-entity acceptance probability of the primary pass
    pub link_probability: f64,
    /// Per-entity acceptance probability of the target-to-source pass
    pub reverse_link_probability: f64,
    /// Per-token acceptance probability of the residual pass
    pub residual_probability: f64,
    /// Per-marker duplication probability
    pub augment_probability: f64,
    /// Run the residual single-token pass
    pub residual_pass: bool,
    /// Reject spans whose token counts differ by this factor or more
    pub max_span_ratio: usize,
    /// Density gate threshold
    pub density_threshold: f64,
    /// Lower bound of the placeholder identifier range
    pub pool_floor: usize,
    /// Identifier range for duplicated markers
    pub augment_range: usize,
    /// Re-glue punctuation after rebuild
    pub normalize_punctuation: bool,
    /// Re-glue split Arabic-script diacritics after rebuild
    pub rejoin_diacritics: bool,
    /// Base seed; `None` draws one from the OS at processor creation
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: LinkingStrategy::default(),
            class_policy: ClassPolicy::default(),
            growth: SpanGrowth::default(),
            single_token: SingleTokenPolicy::default(),
            link_probability: 1.0,
            reverse_link_probability: 1.0,
            residual_probability: defaults::RESIDUAL_PROBABILITY,
            augment_probability: 0.0,
            residual_pass: true,
            max_span_ratio: defaults::MAX_SPAN_RATIO,
            density_threshold: defaults::DENSITY_THRESHOLD,
            pool_floor: defaults::POOL_FLOOR,
            augment_range: defaults::AUGMENT_RANGE,
            normalize_punctuation: true,
            rejoin_diacritics: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("link_probability", self.link_probability),
            ("reverse_link_probability", self.reverse_link_probability),
            ("residual_probability", self.residual_probability),
            ("augment_probability", self.augment_probability),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.max_span_ratio < 1 {
            return Err(CoreError::Configuration(
                "max_span_ratio must be at least 1".into(),
            ));
        }

        if self.density_threshold.is_nan() || self.density_threshold < 0.0 {
            return Err(CoreError::Configuration(format!(
                "density_threshold must be non-negative, got {}",
                self.density_threshold
            )));
        }

        Ok(())
    }
}

/// Fluent builder for [`EngineConfig`]
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a builder starting from defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the linking strategy
    pub fn strategy(mut self, strategy: LinkingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the anchor class policy
    pub fn class_policy(mut self, policy: ClassPolicy) -> Self {
        self.config.class_policy = policy;
        self
    }

    /// Set the span growth rule
    pub fn growth(mut self, growth: SpanGrowth) -> Self {
        self.config.growth = growth;
        self
    }

    /// Set the single-token policy
    pub fn single_token(mut self, policy: SingleTokenPolicy) -> Self {
        self.config.single_token = policy;
        self
    }

    /// Set the primary acceptance probability; the reverse pass follows it
    pub fn link_probability(mut self, p: f64) -> Self {
        self.config.link_probability = p;
        self.config.reverse_link_probability = p;
        self
    }

    /// Set the target-to-source acceptance probability
    pub fn reverse_link_probability(mut self, p: f64) -> Self {
        self.config.reverse_link_probability = p;
        self
    }

    /// Set the residual pass acceptance probability
    pub fn residual_probability(mut self, p: f64) -> Self {
        self.config.residual_probability = p;
        self
    }

    /// Set the marker duplication probability
    pub fn augment_probability(mut self, p: f64) -> Self {
        self.config.augment_probability = p;
        self
    }

    /// Enable or disable the residual pass
    pub fn residual_pass(mut self, enabled: bool) -> Self {
        self.config.residual_pass = enabled;
        self
    }

    /// Set the span ratio guard
    pub fn max_span_ratio(mut self, ratio: usize) -> Self {
        self.config.max_span_ratio = ratio;
        self
    }

    /// Set the density gate threshold
    pub fn density_threshold(mut self, threshold: f64) -> Self {
        self.config.density_threshold = threshold;
        self
    }

    /// Set the placeholder range floor
    pub fn pool_floor(mut self, floor: usize) -> Self {
        self.config.pool_floor = floor;
        self
    }

    /// Set the identifier range for duplicated markers
    pub fn augment_range(mut self, range: usize) -> Self {
        self.config.augment_range = range;
        self
    }

    /// Enable or disable punctuation normalization
    pub fn normalize_punctuation(mut self, enabled: bool) -> Self {
        self.config.normalize_punctuation = enabled;
        self
    }

    /// Enable or disable diacritic re-gluing
    pub fn rejoin_diacritics(mut self, enabled: bool) -> Self {
        self.config.rejoin_diacritics = enabled;
        self
    }

    /// Fix the base seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Adapt the configuration to a target language listed in `tags`
    pub fn target_language(mut self, code: &str, tags: &TagConfig) -> Self {
        if tags.is_low_resource(code) {
            self.config.single_token = SingleTokenPolicy::FirstLink;
        }
        if tags.rejoins_diacritics(code) {
            self.config.rejoin_diacritics = true;
        }
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Tag configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagConfig {
    /// Descriptive metadata
    pub metadata: MetadataConfig,
    /// Admitted and wildcard classes
    pub tags: TagsConfig,
    /// Per-language adjustments
    #[serde(default)]
    pub languages: LanguagesConfig,
    /// Stopword lists by category
    #[serde(default)]
    pub stopwords: StopwordConfig,
}

/// Descriptive metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Name of the tag scheme
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Entity class sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Classes eligible for substitution
    pub admitted: Vec<String>,
    /// Classes interchangeable under [`ClassPolicy::Wildcard`]
    #[serde(default)]
    pub wildcard: Vec<String>,
}

/// Per-language adjustments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguagesConfig {
    /// Targets that link single tokens to their first aligned word
    #[serde(default)]
    pub low_resource: Vec<String>,
    /// Targets whose split diacritics are re-glued
    #[serde(default)]
    pub diacritic_rejoin: Vec<String>,
}

/// Stopword lists keyed by an arbitrary category name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopwordConfig {
    /// Lists by category
    #[serde(flatten)]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl TagConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TagConfig = toml::from_str(text)
            .map_err(|e| CoreError::Configuration(format!("Failed to parse tag config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the admitted set is usable
    pub fn validate(&self) -> Result<()> {
        if self.metadata.name.trim().is_empty() {
            return Err(CoreError::Configuration(
                "metadata.name must not be empty".into(),
            ));
        }
        if self.tags.admitted.is_empty() {
            return Err(CoreError::Configuration(
                "tags.admitted must list at least one class".into(),
            ));
        }
        if let Some(bad) = self
            .tags
            .admitted
            .iter()
            .chain(&self.tags.wildcard)
            .find(|c| c.is_empty() || c.starts_with("B-") || c.starts_with("I-"))
        {
            return Err(CoreError::Configuration(format!(
                "class names must be bare labels, got '{bad}'"
            )));
        }
        Ok(())
    }

    /// Admitted and wildcard classes
    pub fn tag_set(&self) -> TagSet {
        TagSet::new(self.tags.admitted.iter(), self.tags.wildcard.iter())
    }

    /// Union of every stopword category
    pub fn stop_words(&self) -> StopWords {
        StopWords::new(self.stopwords.categories.values().flatten())
    }

    /// Whether `code` is listed as a low-resource target
    pub fn is_low_resource(&self, code: &str) -> bool {
        self.languages.low_resource.iter().any(|c| c == code)
    }

    /// Whether `code` needs diacritic re-gluing
    pub fn rejoins_diacritics(&self, code: &str) -> bool {
        self.languages.diacritic_rejoin.iter().any(|c| c == code)
    }
}

static DEFAULT_TAG_CONFIG: OnceLock<TagConfig> = OnceLock::new();

/// Raw text of the embedded default tag configuration
pub const DEFAULT_TAG_CONFIG_TOML: &str = include_str!("../configs/default.toml");

/// The embedded default tag configuration
pub fn default_tag_config() -> &'static TagConfig {
    DEFAULT_TAG_CONFIG.get_or_init(|| {
        TagConfig::from_toml_str(DEFAULT_TAG_CONFIG_TOML)
            .expect("Failed to load embedded tag config")
    })
}
