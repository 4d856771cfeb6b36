//! Word tokenization for display.
//!
//! Extracted text still carries residue (stray tags, markdown markers,
//! links). [`tokenize`] strips it and keeps only tokens a reader would
//! recognise as words.

use std::ops::Index;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static LINE_ENDING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n|\r").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static HEADING_MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#{1,6}\s").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_`~]{1,3}").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

/// Split text into display words.
///
/// Markup, URLs and e-mail addresses are removed first; each remaining
/// whitespace-separated token loses leading and trailing characters other
/// than ASCII letters, digits and `'`, and is kept only if it contains an
/// ASCII letter.
///
/// ```
/// assert_eq!(
///     tachy::tokenize("Hello, World! Visit https://example.com now. #1"),
///     ["Hello", "World", "Visit", "now"]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let text = LINE_ENDING.replace_all(text, "\n");
    let text = TAG.replace_all(&text, " ");
    let text = HEADING_MARK.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = URL.replace_all(&text, "");
    let text = EMAIL.replace_all(&text, "");

    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '\'')))
        .filter(|token| token.bytes().any(|b| b.is_ascii_alphabetic()))
        .map(str::to_string)
        .collect()
}

/// An immutable, cheaply cloned sequence of words.
///
/// Loading a new document replaces the whole sequence; clones share storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSequence(Arc<[String]>);

impl WordSequence {
    pub fn from_text(text: &str) -> Self {
        Self::from(tokenize(text))
    }

    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for WordSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<String>> for WordSequence {
    fn from(words: Vec<String>) -> Self {
        Self(Arc::from(words))
    }
}

impl Index<usize> for WordSequence {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_example_sentence() {
        assert_eq!(
            tokenize("Hello, World! Visit https://example.com now. #1"),
            ["Hello", "World", "Visit", "now"]
        );
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
    }

    #[test]
    fn test_markdown_residue() {
        assert_eq!(
            tokenize("## Heading\r\n**bold** and _italic_ `code` ~~gone~~"),
            ["Heading", "bold", "and", "italic", "code", "gone"]
        );
    }

    #[test]
    fn test_tags_and_email() {
        assert_eq!(
            tokenize("<p>Write to me@example.org</p><br/>soon"),
            ["Write", "to", "soon"]
        );
    }

    #[test]
    fn test_apostrophes_kept() {
        assert_eq!(
            tokenize("'Tis the readers' \"don't\" (rock'n'roll)"),
            ["'Tis", "the", "readers'", "don't", "rock'n'roll"]
        );
    }

    #[test]
    fn test_numbers_and_punctuation_dropped() {
        assert_eq!(tokenize("1984 -- ... 3rd 42!"), ["3rd"]);
    }

    #[test]
    fn test_non_ascii_letters_need_an_ascii_letter() {
        assert_eq!(tokenize("naïve Ωmega ДА"), ["naïve", "mega"]);
    }

    #[test]
    fn test_word_sequence() {
        let words = WordSequence::from_text("one two three");
        assert_eq!(words.len(), 3);
        assert_eq!(&words[1], "two");
        assert_eq!(words.get(3), None);
        let shared = words.clone();
        assert_eq!(shared.iter().collect::<Vec<_>>(), ["one", "two", "three"]);
        assert!(WordSequence::default().is_empty());
    }

    proptest! {
        #[test]
        fn prop_idempotent_on_plain_text(text in "[a-zA-Z0-9 ,.!?'\\-\n]{0,200}") {
            let once = tokenize(&text);
            let twice = tokenize(&once.join(" "));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_total_and_lettered(text in any::<String>()) {
            for word in tokenize(&text) {
                prop_assert!(!word.is_empty());
                prop_assert!(word.bytes().any(|b| b.is_ascii_alphabetic()));
            }
        }
    }
}
