//! Lexical comparison helpers
//!
//! Tokens from the two sides of a pair are compared in a folded form:
//! lowercased, compatibility-decomposed, with combining marks removed and a
//! handful of Latin ligatures expanded. Similarity is plain Levenshtein
//! distance over that form.

use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Coarse character composition of a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    /// ASCII decimal digits only
    Numeric,
    /// ASCII letters only
    Alphabetic,
    /// Punctuation or symbols only
    Symbolic,
    /// Anything else, including internal whitespace
    Mixed,
}

/// Fold a token to its comparable form
pub fn normalize(token: &str) -> String {
    let mut folded = String::with_capacity(token.len());
    for ch in token.to_lowercase().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        match ch {
            'ß' => folded.push_str("ss"),
            'æ' => folded.push_str("ae"),
            'œ' => folded.push_str("oe"),
            'þ' => folded.push_str("th"),
            'ø' => folded.push('o'),
            'ł' => folded.push('l'),
            'đ' | 'ð' => folded.push('d'),
            'ı' => folded.push('i'),
            _ => folded.push(ch),
        }
    }
    folded
}

/// Levenshtein distance with unit costs, over Unicode scalar values
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1])
            };
        }
    }

    dp[m][n]
}

/// Classify a string by its character composition, ignoring outer whitespace
pub fn classify_type(text: &str) -> TextType {
    let text = text.trim();
    if text.is_empty() {
        return TextType::Mixed;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        TextType::Numeric
    } else if text.chars().all(|c| c.is_ascii_alphabetic()) {
        TextType::Alphabetic
    } else if text
        .chars()
        .all(|c| !(c.is_alphanumeric() || c == '_' || c.is_whitespace()))
    {
        TextType::Symbolic
    } else {
        TextType::Mixed
    }
}

/// Non-empty and made only of alphanumeric characters
pub fn is_alnum(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_alphanumeric)
}

/// Function words that never become placeholders on their own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Build from any list of words
    ///
    /// Each entry is stored lowercased and in its folded form, so lookups
    /// succeed for both raw and normalized words.
    pub fn new<I>(words: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            let lower = word.as_ref().to_lowercase();
            set.insert(normalize(&lower));
            set.insert(lower);
        }
        Self { words: set }
    }

    /// Case-insensitive membership
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of stored forms
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// A word worth linking on lexical identity alone: alphanumeric,
    /// longer than one character, not a stopword
    pub fn is_plausible(&self, normalized: &str) -> bool {
        is_alnum(normalized) && normalized.chars().count() > 1 && !self.contains(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_case_and_accents() {
        assert_eq!(normalize("Zürich"), "zurich");
        assert_eq!(normalize("CITTÀ"), "citta");
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("Straße"), "strasse");
        assert_eq!(normalize("Łódź"), "lodz");
    }

    #[test]
    fn test_normalize_keeps_plain_ascii() {
        assert_eq!(normalize("london"), "london");
        assert_eq!(normalize("${DNT0}4"), "${dnt0}4");
    }

    #[test]
    fn test_distance_known_values() {
        let table = [
            ("kitten", "sitting", 3),
            ("flaw", "lawn", 2),
            ("", "abc", 3),
            ("abc", "", 3),
            ("", "", 0),
            ("rome", "roma", 1),
            ("intention", "execution", 5),
            ("saturday", "sunday", 3),
        ];
        for (a, b, expected) in table {
            assert_eq!(distance(a, b), expected, "distance({a:?}, {b:?})");
        }
    }

    #[test]
    fn test_distance_counts_characters_not_bytes() {
        assert_eq!(distance("città", "citta"), 1);
    }

    #[test]
    fn test_classify_type() {
        assert_eq!(classify_type("2024"), TextType::Numeric);
        assert_eq!(classify_type("London"), TextType::Alphabetic);
        assert_eq!(classify_type("?!"), TextType::Symbolic);
        assert_eq!(classify_type("New York"), TextType::Mixed);
        assert_eq!(classify_type("R2D2"), TextType::Mixed);
        assert_eq!(classify_type(" Paris "), TextType::Alphabetic);
        assert_eq!(classify_type(""), TextType::Mixed);
    }

    #[test]
    fn test_classify_type_non_decimal_numerals_are_mixed() {
        assert_eq!(classify_type("½"), TextType::Mixed);
        assert_eq!(classify_type("Ⅻ"), TextType::Mixed);
        assert_eq!(classify_type("٣"), TextType::Mixed);
        assert_eq!(classify_type("12"), TextType::Numeric);
    }

    #[test]
    fn test_is_alnum() {
        assert!(is_alnum("abc123"));
        assert!(is_alnum("città"));
        assert!(!is_alnum(""));
        assert!(!is_alnum("a-b"));
        assert!(!is_alnum("${DNT0}1"));
    }

    #[test]
    fn test_stopwords_plausibility() {
        let stops = StopWords::new(["the", "Della", "perché"]);
        assert!(stops.contains("THE"));
        assert!(stops.contains("della"));
        assert!(stops.contains("perche"));
        assert!(stops.contains("perché"));
        assert!(!stops.is_plausible("the"));
        assert!(!stops.is_plausible("x"));
        assert!(!stops.is_plausible("n.y."));
        assert!(stops.is_plausible("milano"));
    }
}
