//! Word-alignment relation between source and target positions

use crate::error::{CoreError, Result};
use smallvec::SmallVec;
use std::str::FromStr;

/// Linked positions on the other side of a pair, ascending
pub type Links = SmallVec<[usize; 4]>;

/// A set of `(source index, target index)` links
///
/// Not necessarily a bijection: an index may appear any number of times on
/// either side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentRelation {
    pairs: Vec<(usize, usize)>,
}

impl AlignmentRelation {
    /// Build a relation from explicit pairs; duplicates are removed
    pub fn new(mut pairs: Vec<(usize, usize)>) -> Self {
        pairs.sort_unstable();
        pairs.dedup();
        Self { pairs }
    }

    /// Parse one alignment line of whitespace-separated `i-j` tokens
    pub fn parse(line: &str) -> Result<Self> {
        let pairs = line
            .split_whitespace()
            .map(parse_token)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(pairs))
    }

    /// Target positions linked to source position `source`
    pub fn targets_of(&self, source: usize) -> Links {
        self.pairs
            .iter()
            .filter(|(s, _)| *s == source)
            .map(|(_, t)| *t)
            .collect()
    }

    /// Source positions linked to target position `target`
    pub fn sources_of(&self, target: usize) -> Links {
        let mut links: Links = self
            .pairs
            .iter()
            .filter(|(_, t)| *t == target)
            .map(|(s, _)| *s)
            .collect();
        links.sort_unstable();
        links
    }

    /// Whether `source` and `target` are linked
    pub fn links(&self, source: usize, target: usize) -> bool {
        self.pairs.binary_search(&(source, target)).is_ok()
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the relation has no links
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All links in ascending order
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

impl FromStr for AlignmentRelation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_token(token: &str) -> Result<(usize, usize)> {
    let malformed = || CoreError::MalformedAlignment {
        token: token.to_string(),
    };
    let (left, right) = token.split_once('-').ok_or_else(malformed)?;
    let source = left.parse::<usize>().map_err(|_| malformed())?;
    let target = right.parse::<usize>().map_err(|_| malformed())?;
    Ok((source, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let relation = AlignmentRelation::parse("0-0 1-2 1-1 3-3").unwrap();
        assert_eq!(relation.len(), 4);
        assert_eq!(relation.targets_of(1).as_slice(), &[1, 2]);
        assert_eq!(relation.sources_of(3).as_slice(), &[3]);
        assert!(relation.targets_of(2).is_empty());
        assert!(relation.links(1, 2));
        assert!(!relation.links(2, 1));
    }

    #[test]
    fn test_parse_empty_line() {
        let relation = AlignmentRelation::parse("   \n").unwrap();
        assert!(relation.is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let relation: AlignmentRelation = "2-5 2-5 0-1".parse().unwrap();
        assert_eq!(relation.pairs(), &[(0, 1), (2, 5)]);
    }

    #[test]
    fn test_malformed_tokens() {
        for line in ["0-1 12", "a-1", "1-", "-1-2", "0-1 3--4"] {
            match AlignmentRelation::parse(line) {
                Err(CoreError::MalformedAlignment { .. }) => {}
                other => panic!("expected malformed alignment for {line:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_many_to_many() {
        let relation = AlignmentRelation::parse("0-4 1-4 0-5").unwrap();
        assert_eq!(relation.sources_of(4).as_slice(), &[0, 1]);
        assert_eq!(relation.targets_of(0).as_slice(), &[4, 5]);
    }
}
