//! Selection expansion to whole-word boundaries
//!
//! When the user selects a fragment like "xt" inside "text", annotation
//! should cover the full word. Expansion only engages for English: the
//! selection is split into words, and the first and last word are extended
//! over contiguous alphabetic characters in the surrounding parent text.
//! Any failure to locate a word falls back to the original, unexpanded
//! range rather than erroring.

use crate::language::{Language, classify};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static WORD_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{P}]+").expect("word split pattern is valid"));

/// Half-open range of character offsets into a parent text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        TextRange { start, end }
    }
}

/// Find the first (or last) occurrence of `needle` in `haystack`, as a
/// character offset.
fn find_sub(haystack: &[char], needle: &[char], from_end: bool) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let positions = 0..=haystack.len() - needle.len();
    let matches = |i: &usize| haystack[*i..*i + needle.len()] == *needle;
    if from_end {
        positions.rev().find(matches)
    } else {
        positions.into_iter().find(matches)
    }
}

/// Extend one word over adjacent alphabetic characters in the parent text.
/// `leftward` extends the first selected word backwards; otherwise the last
/// selected word extends forwards. Returns `None` when the word cannot be
/// located in the parent text.
fn expand_word(word: &str, parent: &[char], leftward: bool) -> Option<String> {
    let needle: Vec<char> = word.chars().collect();
    let at = find_sub(parent, &needle, !leftward)?;
    if leftward {
        let mut start = at;
        while start > 0 && parent[start - 1].is_ascii_alphabetic() {
            start -= 1;
        }
        Some(parent[start..at + needle.len()].iter().collect())
    } else {
        let mut end = at + needle.len();
        while end < parent.len() && parent[end].is_ascii_alphabetic() {
            end += 1;
        }
        Some(parent[at..end].iter().collect())
    }
}

/// Grow a selection to whole-word boundaries within its parent text.
///
/// `range` holds character offsets of `selected_text` inside `parent_text`.
/// The returned range covers the fully expanded first and last words; the
/// original range comes back unchanged for non-English selections or when
/// no extension is found.
pub fn expand(range: TextRange, selected_text: &str, parent_text: &str) -> TextRange {
    if classify(selected_text) != Language::English {
        return range;
    }
    let words: Vec<&str> = WORD_SPLIT_RE
        .split(selected_text)
        .filter(|w| !w.is_empty())
        .collect();
    let (Some(&first), Some(&last)) = (words.first(), words.last()) else {
        return range;
    };

    let parent: Vec<char> = parent_text.chars().collect();
    let mut expanded = range;

    if let Some(expanded_first) = expand_word(first, &parent, true) {
        if expanded_first != first {
            let needle: Vec<char> = expanded_first.chars().collect();
            if let Some(start) = find_sub(&parent, &needle, false) {
                debug!(word = first, expanded = %expanded_first, "expanded first word");
                expanded.start = start;
            }
        }
    }

    if let Some(expanded_last) = expand_word(last, &parent, false) {
        if expanded_last != last {
            let needle: Vec<char> = expanded_last.chars().collect();
            if let Some(at) = find_sub(&parent, &needle, false) {
                debug!(word = last, expanded = %expanded_last, "expanded last word");
                expanded.end = at + needle.len();
            }
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(text: &str, range: TextRange) -> String {
        text.chars().skip(range.start).take(range.end - range.start).collect()
    }

    #[test]
    fn test_expand_partial_first_word() {
        let parent = "testing word expansion";
        let range = expand(TextRange::new(0, 4), "test", parent);
        assert_eq!(slice(parent, range), "testing");
    }

    #[test]
    fn test_expand_trailing_fragment() {
        let parent = "some text here";
        // "xt" selected inside "text"
        let range = expand(TextRange::new(7, 9), "xt", parent);
        assert_eq!(slice(parent, range), "text");
    }

    #[test]
    fn test_expand_both_ends_of_multi_word_selection() {
        let parent = "testing word expansion";
        // "sting word expa" spans partial first and last words
        let range = expand(TextRange::new(2, 17), "sting word expa", parent);
        assert_eq!(slice(parent, range), "testing word expansion");
    }

    #[test]
    fn test_whole_word_selection_is_unchanged() {
        let parent = "testing word expansion";
        let range = expand(TextRange::new(8, 12), "word", parent);
        assert_eq!(range, TextRange::new(8, 12));
    }

    #[test]
    fn test_non_english_selection_is_unchanged() {
        let parent = "北京市は大きい";
        let range = expand(TextRange::new(0, 2), "北京", parent);
        assert_eq!(range, TextRange::new(0, 2));
    }

    #[test]
    fn test_word_missing_from_parent_is_unchanged() {
        let range = expand(TextRange::new(0, 4), "test", "completely different");
        assert_eq!(range, TextRange::new(0, 4));
    }

    #[test]
    fn test_empty_selection_is_unchanged() {
        let range = expand(TextRange::new(3, 3), "   ", "some text");
        assert_eq!(range, TextRange::new(3, 3));
    }

    #[test]
    fn test_multibyte_parent_offsets_are_char_based() {
        let parent = "héllo wörld tes";
        let range = expand(TextRange::new(12, 15), "tes", parent);
        // Nothing to extend to the right, left edge already at a boundary
        assert_eq!(range, TextRange::new(12, 15));
    }
}
