//! Per-language text segmentation
//!
//! Every segmentation mode upholds the same round-trip invariant:
//! concatenating the emitted token texts in order reproduces the input
//! exactly. Whitespace and Unicode punctuation travel through as separator
//! tokens that are never looked up.
//!
//! Modes:
//! - English: whitespace runs separate word tokens; punctuation attached to
//!   a word stays inside the token (the lookup layer normalizes the key).
//! - Japanese / Korean: maximal runs per contiguous script block.
//! - Logographic longest-match: greedy prefix-tree scan with a
//!   single-character fallback.
//! - Grapheme mode for hover: one token per character, except that Latin
//!   letters group into whole words.

use crate::language::{Language, classify, is_han, is_hiragana, is_katakana, is_latin_letter};
use crate::trie::PrefixTree;
use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{P}]").expect("separator pattern is valid"));

/// Whitespace or Unicode-punctuation character, i.e. never annotatable.
pub(crate) fn is_separator_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    SEPARATOR_RE.is_match(c.encode_utf8(&mut buf))
}

/// A maximal unit of text produced by segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub language: Language,
    /// Whitespace/punctuation pass-through; never looked up.
    pub is_separator: bool,
}

impl Token {
    pub fn word(text: impl Into<String>, language: Language) -> Self {
        Token {
            text: text.into(),
            language,
            is_separator: false,
        }
    }

    pub fn separator(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            language: Language::Unknown,
            is_separator: true,
        }
    }
}

/// Segment `text` for the given language. Pure function of its inputs.
///
/// Chinese text segmented through this entry point falls back to
/// single-character tokens; callers holding a dictionary trie should use
/// [`segment_longest_match`] instead.
pub fn segment(text: &str, language: Language) -> Vec<Token> {
    match language {
        Language::English => segment_english(text),
        Language::Japanese => segment_by_script(text, language, japanese_script_class),
        Language::Korean => segment_by_script(text, language, korean_script_class),
        Language::Chinese => segment_longest_match(text, &PrefixTree::new()),
        Language::Unknown => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Token::word(text, Language::Unknown)]
            }
        }
    }
}

/// English: whitespace runs are separators, everything between is one word
/// token, punctuation included.
fn segment_english(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut run_is_space: Option<bool> = None;
    for c in text.chars() {
        let is_space = c.is_whitespace();
        if run_is_space != Some(is_space) && !run.is_empty() {
            push_run(&mut tokens, std::mem::take(&mut run), run_is_space == Some(true), Language::English);
        }
        run_is_space = Some(is_space);
        run.push(c);
    }
    if !run.is_empty() {
        push_run(&mut tokens, run, run_is_space == Some(true), Language::English);
    }
    tokens
}

fn push_run(tokens: &mut Vec<Token>, text: String, is_space: bool, language: Language) {
    if is_space {
        tokens.push(Token::separator(text));
    } else {
        tokens.push(Token::word(text, language));
    }
}

/// Script block classes used for run boundaries. Separators get their own
/// class so punctuation inside CJK text still passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptClass {
    Separator,
    Hiragana,
    Katakana,
    Han,
    HangulSyllable,
    HangulJamo,
    Other,
}

fn japanese_script_class(c: char) -> ScriptClass {
    if is_separator_char(c) {
        ScriptClass::Separator
    } else if is_hiragana(c) {
        ScriptClass::Hiragana
    } else if is_katakana(c) {
        ScriptClass::Katakana
    } else if is_han(c) {
        ScriptClass::Han
    } else {
        ScriptClass::Other
    }
}

fn korean_script_class(c: char) -> ScriptClass {
    if is_separator_char(c) {
        ScriptClass::Separator
    } else if ('\u{AC00}'..='\u{D7A3}').contains(&c) {
        ScriptClass::HangulSyllable
    } else if ('\u{1100}'..='\u{11FF}').contains(&c) || ('\u{3130}'..='\u{318F}').contains(&c) {
        ScriptClass::HangulJamo
    } else {
        ScriptClass::Other
    }
}

fn segment_by_script(
    text: &str,
    language: Language,
    class_of: fn(char) -> ScriptClass,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut run_class: Option<ScriptClass> = None;
    for c in text.chars() {
        let class = class_of(c);
        if run_class != Some(class) && !run.is_empty() {
            let is_sep = run_class == Some(ScriptClass::Separator);
            push_run(&mut tokens, std::mem::take(&mut run), is_sep, language);
        }
        run_class = Some(class);
        run.push(c);
    }
    if !run.is_empty() {
        let is_sep = run_class == Some(ScriptClass::Separator);
        push_run(&mut tokens, run, is_sep, language);
    }
    tokens
}

/// Logographic longest-match scan: at each position walk the prefix tree as
/// far as it matches and emit the longest run that ends on a terminal
/// transcription; when nothing matches, emit the single character as a
/// fallback token and advance by one.
pub fn segment_longest_match(text: &str, tree: &PrefixTree) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_separator_char(c) {
            let start = i;
            while i < chars.len() && is_separator_char(chars[i]) {
                i += 1;
            }
            tokens.push(Token::separator(chars[start..i].iter().collect::<String>()));
            continue;
        }
        match tree.longest_match(&chars[i..]) {
            Some((len, _)) => {
                tokens.push(Token::word(
                    chars[i..i + len].iter().collect::<String>(),
                    Language::Chinese,
                ));
                i += len;
            }
            None => {
                tokens.push(Token::word(c.to_string(), Language::Chinese));
                i += 1;
            }
        }
    }
    tokens
}

/// Hover mode: one token per character, classified individually, except
/// that runs of Latin letters group into whole word tokens so English words
/// are looked up intact.
pub fn segment_graphemes(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_separator_char(c) {
            tokens.push(Token::separator(c.to_string()));
            i += 1;
        } else if is_latin_letter(c) {
            let start = i;
            while i < chars.len() && is_latin_letter(chars[i]) {
                i += 1;
            }
            tokens.push(Token::word(
                chars[start..i].iter().collect::<String>(),
                Language::English,
            ));
        } else {
            let single = c.to_string();
            let language = classify(&single);
            tokens.push(Token::word(single, language));
            i += 1;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_english_word_split() {
        let tokens = segment("Hello, world!", Language::English);
        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| !t.is_separator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(words, vec!["Hello,", "world!"]);
    }

    #[test]
    fn test_english_round_trip_preserves_whitespace() {
        let text = "  leading  and\ttabs \n exactly ";
        assert_eq!(reassemble(&segment(text, Language::English)), text);
    }

    #[test]
    fn test_japanese_script_block_runs() {
        let tokens = segment("日本語のテキスト", Language::Japanese);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["日本語", "の", "テキスト"]);
        assert!(tokens.iter().all(|t| !t.is_separator));
    }

    #[test]
    fn test_japanese_punctuation_passes_through() {
        let tokens = segment("これは、テスト。", Language::Japanese);
        let seps: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is_separator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(seps, vec!["、", "。"]);
        assert_eq!(reassemble(&tokens), "これは、テスト。");
    }

    #[test]
    fn test_korean_syllable_runs() {
        let tokens = segment("한국어 텍스트", Language::Korean);
        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| !t.is_separator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(words, vec!["한국어", "텍스트"]);
        assert_eq!(reassemble(&tokens), "한국어 텍스트");
    }

    #[test]
    fn test_longest_match_prefers_longest_entry() {
        let mut tree = PrefixTree::new();
        tree.insert("北", "běi");
        tree.insert("北京", "běi jīng");
        let tokens = segment_longest_match("北京市", &tree);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["北京", "市"]);
    }

    #[test]
    fn test_longest_match_single_char_fallback() {
        let tree = PrefixTree::new();
        let tokens = segment_longest_match("北京", &tree);
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| !t.is_separator));
        assert_eq!(reassemble(&tokens), "北京");
    }

    #[test]
    fn test_longest_match_round_trip_with_separators() {
        let mut tree = PrefixTree::new();
        tree.insert("北京", "běi jīng");
        let text = "北京，市。";
        assert_eq!(reassemble(&segment_longest_match(text, &tree)), text);
    }

    #[test]
    fn test_grapheme_mode_groups_latin_words() {
        let tokens = segment_graphemes("word 北x");
        let texts: Vec<(&str, bool)> = tokens
            .iter()
            .map(|t| (t.text.as_str(), t.is_separator))
            .collect();
        assert_eq!(
            texts,
            vec![("word", false), (" ", true), ("北", false), ("x", false)]
        );
        assert_eq!(tokens[0].language, Language::English);
        assert_eq!(tokens[2].language, Language::Chinese);
    }

    #[test]
    fn test_round_trip_all_modes() {
        let samples = [
            ("Hello, world! How are you?", Language::English),
            ("日本語のテキスト、カタカナもある。", Language::Japanese),
            ("한국어 텍스트입니다.", Language::Korean),
            ("北京市は大きい", Language::Chinese),
        ];
        for (text, language) in samples {
            assert_eq!(reassemble(&segment(text, language)), text, "{}", text);
            assert_eq!(reassemble(&segment_graphemes(text)), text, "{}", text);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("", Language::English).is_empty());
        assert!(segment_graphemes("").is_empty());
        assert!(segment("", Language::Unknown).is_empty());
    }
}
