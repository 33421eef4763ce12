//! Density gate and marker augmentation

use crate::config::EngineConfig;
use crate::lexical::is_alnum;
use crate::sampler::{augmentation_pool, duplicate_marker, scan_markers, Placeholder};
use crate::sentence::{SlotState, WorkingSentence};
use rand::Rng;

/// Rejects pairs whose source is dominated by placeholders
#[derive(Debug, Clone, Copy)]
pub struct DensityGate {
    threshold: f64,
}

impl DensityGate {
    /// Create a gate with the given threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Create a gate following the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.density_threshold)
    }

    /// Placeholders per other alphanumeric word of length > 1
    ///
    /// Defined as 1.0 when the sentence has no such word.
    pub fn density(&self, sentence: &WorkingSentence) -> f64 {
        let mut placeholders = 0usize;
        let mut others = 0usize;

        for slot in sentence.slots() {
            if slot.state != SlotState::Active {
                continue;
            }
            if slot.placeholder.is_some() {
                placeholders += 1;
            } else if slot.word.chars().count() > 1 && is_alnum(&slot.word) {
                others += 1;
            }
        }

        if others == 0 {
            1.0
        } else {
            placeholders as f64 / others as f64
        }
    }

    /// Whether the pair may keep its substitutions
    pub fn admits(&self, sentence: &WorkingSentence) -> bool {
        self.density(sentence) <= self.threshold
    }
}

/// Duplicates markers next to themselves with fresh identifiers
#[derive(Debug, Clone, Copy)]
pub struct Augmenter {
    probability: f64,
    range: usize,
}

impl Augmenter {
    /// Create an augmenter drawing identifiers from at least `0..range`
    pub fn new(probability: f64, range: usize) -> Self {
        Self { probability, range }
    }

    /// Create an augmenter following the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.augment_probability, config.augment_range)
    }

    /// Whether augmentation can ever fire
    pub fn is_enabled(&self) -> bool {
        self.probability > 0.0
    }

    /// Duplicate each distinct source marker with probability `p`
    ///
    /// `pool_range` is the identifier range of the pair's own pool; fresh
    /// identifiers come from `0..max(range, pool_range)` minus every
    /// identifier already present. Returns the rewritten pair and the
    /// number of markers duplicated.
    pub fn augment<R: Rng + ?Sized>(
        &self,
        source: &str,
        target: &str,
        pool_range: usize,
        rng: &mut R,
    ) -> (String, String, usize) {
        let mut source = source.to_string();
        let mut target = target.to_string();
        if !self.is_enabled() {
            return (source, target, 0);
        }

        let mut distinct: Vec<Placeholder> = Vec::new();
        for marker in scan_markers(&source) {
            if !distinct.contains(&marker) {
                distinct.push(marker);
            }
        }
        if distinct.is_empty() {
            return (source, target, 0);
        }

        let mut used = scan_markers(&source);
        used.extend(scan_markers(&target));
        let mut fresh = augmentation_pool(&used, self.range.max(pool_range), rng);

        let mut duplicated = 0;
        for marker in distinct {
            if rng.gen::<f64>() >= self.probability {
                continue;
            }
            let Some(copy) = fresh.next_placeholder() else {
                break;
            };
            source = duplicate_marker(&source, marker, copy);
            target = duplicate_marker(&target, marker, copy);
            duplicated += 1;
        }

        (source, target, duplicated)
    }
}
