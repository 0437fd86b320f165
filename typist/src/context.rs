//! Locating the word around the cursor.
//!
//! Text is walked by grapheme cluster, so a letter followed by combining marks
//! ("e\u{301}") counts as one letter.

use unicode_segmentation::UnicodeSegmentation;

fn graphemes(text: &str) -> Vec<&str> {
    text.graphemes(true).collect()
}

/// A cluster whose base character is a letter
fn is_letter(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_alphabetic)
}

/// Letters, plus an apostrophe with a letter on each side ("don't").
pub fn is_word_character(clusters: &[&str], index: usize) -> bool {
    let Some(&g) = clusters.get(index) else {
        return false;
    };
    if is_letter(g) {
        return true;
    }
    if g == "'" {
        let letter_before = index > 0 && is_letter(clusters[index - 1]);
        let letter_after = clusters.get(index + 1).is_some_and(|n| is_letter(n));
        return letter_before && letter_after;
    }
    false
}

/// True for a non-empty word made only of word characters. Anything else is never corrected.
pub fn is_correctable(word: &str) -> bool {
    let clusters = graphemes(word);
    !clusters.is_empty() && (0..clusters.len()).all(|i| is_word_character(&clusters, i))
}

/// The partial word on either side of the cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    /// Word characters immediately before the cursor
    pub prefix: String,
    /// Word characters immediately after the cursor
    pub suffix: String,
}

impl SearchContext {
    pub fn extract(before: Option<&str>, after: Option<&str>) -> Self {
        let prefix = before.map(|text| {
            let clusters = graphemes(text);
            let start = (0..clusters.len())
                .rev()
                .take_while(|&i| is_word_character(&clusters, i))
                .last()
                .unwrap_or(clusters.len());
            clusters[start..].concat()
        });

        let suffix = after.map(|text| {
            let clusters = graphemes(text);
            let end = (0..clusters.len())
                .take_while(|&i| is_word_character(&clusters, i))
                .count();
            clusters[..end].concat()
        });

        Self {
            prefix: prefix.unwrap_or_default(),
            suffix: suffix.unwrap_or_default(),
        }
    }

    /// The whole word as typed so far
    pub fn typed_word(&self) -> String {
        format!("{}{}", self.prefix, self.suffix)
    }

    /// Lowercased prefix; identifies the background correction search
    pub fn search_key(&self) -> String {
        self.prefix.to_lowercase()
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix.chars().count()
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix.chars().count()
    }
}

/// Whether a word inserted at the cursor needs a space in front of it.
pub fn needs_leading_space(before: Option<&str>) -> bool {
    before
        .and_then(|text| text.chars().last())
        .is_some_and(|c| c.is_alphabetic() || ".,!?:;".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(before: &str, after: &str) -> (String, String) {
        let ctx = SearchContext::extract(Some(before), Some(after));
        (ctx.prefix, ctx.suffix)
    }

    #[test]
    fn test_extract_middle_of_word() {
        assert_eq!(extract("Hello wor", "ld!"), ("wor".into(), "ld".into()));
    }

    #[test]
    fn test_extract_after_space() {
        assert_eq!(extract("Hi ", ""), ("".into(), "".into()));
    }

    #[test]
    fn test_extract_missing_context() {
        let ctx = SearchContext::extract(None, None);
        assert_eq!(ctx, SearchContext::default());
        assert_eq!(SearchContext::extract(Some("the"), None).prefix, "the");
    }

    #[test]
    fn test_extract_whole_text_is_one_word() {
        assert_eq!(extract("hello", "world"), ("hello".into(), "world".into()));
    }

    #[test]
    fn test_extract_keeps_inner_apostrophe() {
        assert_eq!(extract("I don't", ""), ("don't".into(), "".into()));
        assert_eq!(extract("don", "'t go"), ("don".into(), "".into()));
    }

    #[test]
    fn test_extract_trailing_apostrophe_ends_word() {
        // Nothing follows the apostrophe yet, so it is not part of a word
        assert_eq!(extract("don'", ""), ("".into(), "".into()));
        assert_eq!(extract("'quote", ""), ("quote".into(), "".into()));
    }

    #[test]
    fn test_extract_stops_at_digits_and_punctuation() {
        assert_eq!(extract("abc1def", "gh2"), ("def".into(), "gh".into()));
        assert_eq!(extract("end.", ".start"), ("".into(), "".into()));
    }

    #[test]
    fn test_extract_non_ascii_letters() {
        assert_eq!(extract("un café", "s"), ("café".into(), "s".into()));
    }

    #[test]
    fn test_extract_keeps_combining_marks() {
        assert_eq!(extract("un cafe\u{301}", ""), ("cafe\u{301}".into(), "".into()));
        assert_eq!(extract("cafe\u{301}", "s ok"), ("cafe\u{301}".into(), "s".into()));
        assert_eq!(extract("x", "e\u{301}te"), ("x".into(), "e\u{301}te".into()));
    }

    #[test]
    fn test_search_key_is_lowercase_prefix() {
        let ctx = SearchContext::extract(Some("Hello WOr"), Some("ld"));
        assert_eq!(ctx.search_key(), "wor");
        assert_eq!(ctx.typed_word(), "WOrld");
    }

    #[test]
    fn test_is_correctable() {
        assert!(is_correctable("teh"));
        assert!(is_correctable("don't"));
        assert!(!is_correctable(""));
        assert!(!is_correctable("h3llo"));
        assert!(!is_correctable("hello!"));
        assert!(!is_correctable("two words"));
        assert!(!is_correctable("'tis"));
        assert!(is_correctable("cafe\u{301}"));
        assert!(is_correctable("na\u{308}ive"));
    }

    #[test]
    fn test_leading_space() {
        assert!(needs_leading_space(Some("Hello")));
        assert!(needs_leading_space(Some("Hello.")));
        assert!(needs_leading_space(Some("Wait;")));
        assert!(!needs_leading_space(Some("Hello ")));
        assert!(!needs_leading_space(Some("(")));
        assert!(!needs_leading_space(Some("")));
        assert!(!needs_leading_space(None));
    }
}
