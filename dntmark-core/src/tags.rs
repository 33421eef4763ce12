//! BIO tags, tokens and the admitted entity classes

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Label carried by a collapsed span head
pub const ENTITY_LABEL: &str = "ENTITY";

/// Label for tokens outside any entity
pub const OUTSIDE_LABEL: &str = "O";

/// Per-token entity label in BIO form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `B-<CLASS>`: first token of an entity
    Begin(String),
    /// `I-<CLASS>`: continuation of the preceding entity
    Inside(String),
    /// Synthetic label placed on a span head once it holds a placeholder
    Entity,
    /// Non-entity token
    Outside,
}

impl Tag {
    /// Parse a raw tagger label. Anything unrecognised is `Outside`.
    pub fn parse(label: &str) -> Self {
        if let Some(class) = label.strip_prefix("B-") {
            Tag::Begin(class.to_string())
        } else if let Some(class) = label.strip_prefix("I-") {
            Tag::Inside(class.to_string())
        } else if label == ENTITY_LABEL {
            Tag::Entity
        } else {
            Tag::Outside
        }
    }

    /// Entity class for `B-`/`I-` tags
    pub fn class(&self) -> Option<&str> {
        match self {
            Tag::Begin(class) | Tag::Inside(class) => Some(class),
            Tag::Entity | Tag::Outside => None,
        }
    }

    /// Whether this tag begins an entity
    pub fn is_begin(&self) -> bool {
        matches!(self, Tag::Begin(_))
    }

    /// Whether this tag continues an entity, whatever its class
    pub fn is_inside(&self) -> bool {
        matches!(self, Tag::Inside(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Begin(class) => write!(f, "B-{class}"),
            Tag::Inside(class) => write!(f, "I-{class}"),
            Tag::Entity => f.write_str(ENTITY_LABEL),
            Tag::Outside => f.write_str(OUTSIDE_LABEL),
        }
    }
}

/// A surface form together with its tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form as produced by the tokenizer
    pub word: String,
    /// Entity tag
    pub tag: Tag,
}

impl Token {
    /// Create a token from a word and a raw label
    pub fn new(word: impl Into<String>, label: &str) -> Self {
        Self {
            word: word.into(),
            tag: Tag::parse(label),
        }
    }

    /// Create an untagged token
    pub fn plain(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: Tag::Outside,
        }
    }
}

/// Build a sentence from `(word, label)` pairs
pub fn sentence<'a, I>(pairs: I) -> Vec<Token>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(word, label)| Token::new(word, label))
        .collect()
}

/// How strictly the class of an aligned anchor must agree with the source class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassPolicy {
    /// Classes must be identical
    Exact,
    /// Identical, or either class is in the wildcard set
    #[default]
    Wildcard,
    /// No class check at all
    Unchecked,
}

/// The closed set of entity classes the engine acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    admitted: BTreeSet<String>,
    wildcard: BTreeSet<String>,
}

impl TagSet {
    /// Create a tag set from admitted and wildcard class names
    pub fn new<A, W>(admitted: A, wildcard: W) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            admitted: admitted.into_iter().map(Into::into).collect(),
            wildcard: wildcard.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `class` belongs to the admitted set
    pub fn is_admitted(&self, class: &str) -> bool {
        self.admitted.contains(class)
    }

    /// Whether the tag carries an admitted class
    pub fn admits(&self, tag: &Tag) -> bool {
        tag.class().is_some_and(|class| self.is_admitted(class))
    }

    /// Whether `class` is interchangeable with any other class
    pub fn is_wildcard(&self, class: &str) -> bool {
        self.wildcard.contains(class)
    }

    /// Number of admitted classes
    pub fn admitted_len(&self) -> usize {
        self.admitted.len()
    }

    /// Iterate over admitted class names in sorted order
    pub fn admitted(&self) -> impl Iterator<Item = &str> {
        self.admitted.iter().map(String::as_str)
    }

    /// Decide whether an anchor with class `target` may stand for `source`
    pub fn classes_compatible(
        &self,
        policy: ClassPolicy,
        source: &str,
        target: Option<&str>,
    ) -> bool {
        match policy {
            ClassPolicy::Unchecked => true,
            ClassPolicy::Exact => target == Some(source),
            ClassPolicy::Wildcard => {
                target == Some(source)
                    || self.is_wildcard(source)
                    || target.is_some_and(|t| self.is_wildcard(t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_set() -> TagSet {
        TagSet::new(["LOC", "PERSON", "ORG"], ["ORG", "PRODUCT"])
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(Tag::parse("B-LOC"), Tag::Begin("LOC".into()));
        assert_eq!(Tag::parse("I-PERSON"), Tag::Inside("PERSON".into()));
        assert_eq!(Tag::parse("ENTITY"), Tag::Entity);
        assert_eq!(Tag::parse("O"), Tag::Outside);
        assert_eq!(Tag::parse(""), Tag::Outside);
        assert_eq!(Tag::parse("X-LOC"), Tag::Outside);
    }

    #[test]
    fn test_display_round_trips_labels() {
        for label in ["B-GPE", "I-FAC", "ENTITY", "O"] {
            assert_eq!(Tag::parse(label).to_string(), label);
        }
    }

    #[test]
    fn test_admits_only_known_classes() {
        let tags = tag_set();
        assert!(tags.admits(&Tag::parse("B-LOC")));
        assert!(tags.admits(&Tag::parse("I-ORG")));
        assert!(!tags.admits(&Tag::parse("B-DATE")));
        assert!(!tags.admits(&Tag::Outside));
    }

    #[test]
    fn test_class_policies() {
        let tags = tag_set();

        assert!(tags.classes_compatible(ClassPolicy::Exact, "LOC", Some("LOC")));
        assert!(!tags.classes_compatible(ClassPolicy::Exact, "LOC", Some("PERSON")));
        assert!(!tags.classes_compatible(ClassPolicy::Exact, "LOC", None));

        assert!(tags.classes_compatible(ClassPolicy::Wildcard, "ORG", Some("PERSON")));
        assert!(tags.classes_compatible(ClassPolicy::Wildcard, "LOC", Some("PRODUCT")));
        assert!(!tags.classes_compatible(ClassPolicy::Wildcard, "LOC", Some("PERSON")));
        assert!(!tags.classes_compatible(ClassPolicy::Wildcard, "LOC", None));

        assert!(tags.classes_compatible(ClassPolicy::Unchecked, "LOC", None));
    }
}
