//! Character prefix tree for logographic longest-match lookup
//!
//! The Chinese dictionary ships as nested JSON objects keyed by successive
//! characters, with the reserved key `"_"` holding the transcription when a
//! valid word ends at that node. A node may carry both a terminal
//! transcription and children for longer words, which is what makes
//! longest-match tokenization possible: "北" and "北京" can coexist, and
//! the tokenizer prefers the deeper match.

use crate::error::{PhonotateError, PhonotateResult};
use serde_json::Value;
use std::collections::HashMap;

/// Reserved key carrying the terminal transcription inside a tree node.
const TERMINAL_KEY: &str = "_";

#[derive(Debug, Clone, Default, PartialEq)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    transcription: Option<String>,
}

/// Read-only character trie, built once from a dictionary resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefixTree {
    root: TrieNode,
}

impl PrefixTree {
    pub fn new() -> Self {
        PrefixTree::default()
    }

    /// Build a tree from the nested-object dictionary shape.
    ///
    /// The terminal value under `"_"` may be a plain string or an array of
    /// syllable strings (the phrase exporter emits one syllable per
    /// character); arrays are joined with single spaces.
    pub fn from_json(value: &Value) -> PhonotateResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            PhonotateError::ParseError("prefix-tree root must be an object".to_string())
        })?;
        let mut root = TrieNode::default();
        Self::fill_node(&mut root, obj)?;
        Ok(PrefixTree { root })
    }

    fn fill_node(
        node: &mut TrieNode,
        obj: &serde_json::Map<String, Value>,
    ) -> PhonotateResult<()> {
        for (key, value) in obj {
            if key == TERMINAL_KEY {
                node.transcription = Some(Self::terminal_value(value)?);
                continue;
            }
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(PhonotateError::ParseError(format!(
                    "prefix-tree key must be a single character, got '{}'",
                    key
                )));
            };
            let child = node.children.entry(c).or_default();
            let child_obj = value.as_object().ok_or_else(|| {
                PhonotateError::ParseError(format!(
                    "prefix-tree node for '{}' must be an object",
                    c
                ))
            })?;
            Self::fill_node(child, child_obj)?;
        }
        Ok(())
    }

    fn terminal_value(value: &Value) -> PhonotateResult<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                if parts.len() != items.len() {
                    return Err(PhonotateError::ParseError(
                        "prefix-tree terminal array must contain only strings".to_string(),
                    ));
                }
                Ok(parts.join(" "))
            }
            other => Err(PhonotateError::ParseError(format!(
                "prefix-tree terminal must be a string or array, got {}",
                other
            ))),
        }
    }

    /// Insert a word directly. Used by tests and by callers that assemble a
    /// tree programmatically instead of from JSON.
    pub fn insert(&mut self, word: &str, transcription: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        node.transcription = Some(transcription.to_string());
    }

    /// Exact-match lookup of a whole word.
    pub fn get(&self, word: &str) -> Option<&str> {
        let mut node = &self.root;
        for c in word.chars() {
            node = node.children.get(&c)?;
        }
        node.transcription.as_deref()
    }

    /// Walk the tree as far as `chars` matches and return the longest
    /// prefix at which a terminal transcription exists, as
    /// `(matched_char_count, transcription)`. `None` when not even the
    /// first character matches a terminal node on the walked path.
    pub fn longest_match<'a>(&'a self, chars: &[char]) -> Option<(usize, &'a str)> {
        let mut node = &self.root;
        let mut best: Option<(usize, &'a str)> = None;
        for (i, c) in chars.iter().enumerate() {
            match node.children.get(c) {
                Some(child) => {
                    node = child;
                    if let Some(t) = node.transcription.as_deref() {
                        best = Some((i + 1, t));
                    }
                }
                None => break,
            }
        }
        best
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}
