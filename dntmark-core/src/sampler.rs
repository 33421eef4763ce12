//! Placeholder identifiers and the per-pair identifier pool

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Literal prefix of every placeholder marker
pub const MARKER_PREFIX: &str = "${DNT0}";

/// Do-not-translate placeholder, unique within one sentence pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Placeholder(pub u32);

impl Placeholder {
    /// Numeric identifier
    pub fn id(self) -> u32 {
        self.0
    }

    /// Marker text embedded in the rewritten sentences
    pub fn marker(self) -> String {
        format!("{MARKER_PREFIX}{}", self.0)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MARKER_PREFIX}{}", self.0)
    }
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\$\{DNT0\}(\d+)").expect("marker pattern is valid"))
}

/// Every placeholder marker in `text`, in order of appearance
pub fn scan_markers(text: &str) -> Vec<Placeholder> {
    marker_regex()
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok().map(Placeholder))
        .collect()
}

/// Whether `text` contains a placeholder marker
pub fn contains_marker(text: &str) -> bool {
    text.contains(MARKER_PREFIX)
}

/// Insert ` <duplicate>` after every occurrence of `original`
///
/// Matches whole identifiers only, so `${DNT0}1` never matches inside
/// `${DNT0}12`.
pub fn duplicate_marker(text: &str, original: Placeholder, duplicate: Placeholder) -> String {
    marker_regex()
        .replace_all(text, |caps: &regex::Captures| {
            if caps[1].parse::<u32>().ok() == Some(original.id()) {
                format!("{} {}", &caps[0], duplicate.marker())
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Pool of distinct identifiers for one sentence pair
///
/// Holds a random permutation of `n` values drawn from
/// `0..max(floor, n)`; identifiers are handed out from the end.
#[derive(Debug, Clone)]
pub struct PlaceholderSampler {
    pool: Vec<u32>,
    issued: Vec<Placeholder>,
}

impl PlaceholderSampler {
    /// Draw a pool sized for a source sentence of `sentence_len` tokens
    pub fn new<R: Rng + ?Sized>(sentence_len: usize, floor: usize, rng: &mut R) -> Self {
        let range = floor.max(sentence_len) as u32;
        let pool = rand::seq::index::sample(rng, range as usize, sentence_len)
            .into_iter()
            .map(|i| i as u32)
            .collect();
        Self {
            pool,
            issued: Vec::new(),
        }
    }

    /// Build a sampler over an explicit pool; the last entry is issued first
    pub fn from_pool(pool: Vec<u32>) -> Self {
        Self {
            pool,
            issued: Vec::new(),
        }
    }

    /// Mint the next placeholder, or `None` once the pool is exhausted
    pub fn next_placeholder(&mut self) -> Option<Placeholder> {
        let placeholder = self.pool.pop().map(Placeholder)?;
        self.issued.push(placeholder);
        Some(placeholder)
    }

    /// Identifiers still available
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    /// Placeholders handed out so far, in issue order
    pub fn issued(&self) -> &[Placeholder] {
        &self.issued
    }
}

/// Fresh identifiers for duplicated markers, avoiding every id in `used`
pub fn augmentation_pool<R: Rng + ?Sized>(
    used: &[Placeholder],
    range: usize,
    rng: &mut R,
) -> PlaceholderSampler {
    let mut pool: Vec<u32> = (0..range as u32)
        .filter(|id| !used.iter().any(|p| p.0 == *id))
        .collect();
    pool.shuffle(rng);
    PlaceholderSampler::from_pool(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_marker_rendering() {
        assert_eq!(Placeholder(7).marker(), "${DNT0}7");
        assert_eq!(Placeholder(12).to_string(), "${DNT0}12");
    }

    #[test]
    fn test_scan_markers() {
        let found = scan_markers("in ${DNT0}3, near ${DNT0}14 and ${DNT0}3.");
        assert_eq!(found, vec![Placeholder(3), Placeholder(14), Placeholder(3)]);
        assert!(scan_markers("no markers here").is_empty());
    }

    #[test]
    fn test_duplicate_marker_matches_whole_ids() {
        let text = "${DNT0}1 and ${DNT0}12 then ${DNT0}1.";
        assert_eq!(
            duplicate_marker(text, Placeholder(1), Placeholder(40)),
            "${DNT0}1 ${DNT0}40 and ${DNT0}12 then ${DNT0}1 ${DNT0}40."
        );
        assert_eq!(duplicate_marker("plain", Placeholder(1), Placeholder(2)), "plain");
    }

    #[test]
    fn test_short_sentence_draws_from_floor_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sampler = PlaceholderSampler::new(5, 25, &mut rng);
        assert_eq!(sampler.remaining(), 5);

        let mut seen = HashSet::new();
        while let Some(p) = sampler.next_placeholder() {
            assert!(p.id() < 25);
            assert!(seen.insert(p), "identifier {p} issued twice");
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(sampler.issued().len(), 5);
    }

    #[test]
    fn test_long_sentence_extends_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sampler = PlaceholderSampler::new(40, 25, &mut rng);

        let mut ids: Vec<u32> = std::iter::from_fn(|| sampler.next_placeholder())
            .map(Placeholder::id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_exhaustion_is_not_fatal() {
        let mut sampler = PlaceholderSampler::from_pool(vec![4, 9]);
        assert_eq!(sampler.next_placeholder(), Some(Placeholder(9)));
        assert_eq!(sampler.next_placeholder(), Some(Placeholder(4)));
        assert_eq!(sampler.next_placeholder(), None);
        assert_eq!(sampler.next_placeholder(), None);
    }

    #[test]
    fn test_empty_sentence_has_empty_pool() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut sampler = PlaceholderSampler::new(0, 25, &mut rng);
        assert_eq!(sampler.next_placeholder(), None);
    }

    #[test]
    fn test_augmentation_pool_avoids_used_ids() {
        let mut rng = StdRng::seed_from_u64(3);
        let used = [Placeholder(0), Placeholder(2)];
        let mut pool = augmentation_pool(&used, 4, &mut rng);
        let mut ids: Vec<u32> = std::iter::from_fn(|| pool.next_placeholder())
            .map(Placeholder::id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }
}
