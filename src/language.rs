//! Script-based language classification
//!
//! Classification applies a fixed, ordered list of script-range rules and
//! returns the tag of the first rule matching any character of the input.
//! The order matters because the patterns overlap: a string containing any
//! Han character is Chinese before kana or Latin rules are consulted, and
//! Hangul is checked before kana. Single characters and whole paragraphs go
//! through the same function; the hover path classifies per character while
//! the selection path classifies the full selected run.

use serde::{Deserialize, Serialize};

/// A supported annotation language, or `Unknown` when no script rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Chinese,
    Japanese,
    Korean,
    Unknown,
}

impl Language {
    /// All languages that can carry a dictionary.
    pub fn all() -> [Language; 4] {
        [
            Language::English,
            Language::Chinese,
            Language::Japanese,
            Language::Korean,
        ]
    }

    /// Stable lowercase name, used for `data-language` attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Chinese => "chinese",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Unknown => "unknown",
        }
    }

    /// Inverse of [`Language::as_str`], for reading `data-language` back.
    pub fn from_tag(tag: &str) -> Language {
        match tag {
            "english" => Language::English,
            "chinese" => Language::Chinese,
            "japanese" => Language::Japanese,
            "korean" => Language::Korean,
            _ => Language::Unknown,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A regional pronunciation variant. Only English distinguishes accents;
/// every other language uses the single `Standard` accent, and accent
/// selection never changes non-English lookup results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Us,
    Uk,
    Standard,
}

impl Accent {
    /// Inverse of [`Accent::as_str`], for reading `data-accent` back.
    /// Unrecognized tags resolve to `Standard`.
    pub fn from_tag(tag: &str) -> Accent {
        match tag {
            "us" => Accent::Us,
            "uk" => Accent::Uk,
            _ => Accent::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Us => "us",
            Accent::Uk => "uk",
            Accent::Standard => "standard",
        }
    }
}

impl std::fmt::Display for Accent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

pub(crate) fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
        || ('\u{1100}'..='\u{11FF}').contains(&c)
        || ('\u{3130}'..='\u{318F}').contains(&c)
}

pub(crate) fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

pub(crate) fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub(crate) fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

pub(crate) fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Classify a string by the first matching script rule.
///
/// Pure function of the input: same text always yields the same tag, and
/// unrecognized input yields [`Language::Unknown`] rather than failing.
pub fn classify(text: &str) -> Language {
    if text.chars().any(is_han) {
        return Language::Chinese;
    }
    if text.chars().any(is_hangul) {
        return Language::Korean;
    }
    if text.chars().any(is_kana) {
        return Language::Japanese;
    }
    if text.chars().any(is_latin_letter) {
        return Language::English;
    }
    Language::Unknown
}
