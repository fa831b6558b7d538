//! Read-only pronunciation dictionary service
//!
//! One JSON resource per language, fetched asynchronously through a
//! [`ResourceFetcher`] and parsed into a per-language table. Three resource
//! shapes exist because the dictionary format evolved:
//!
//! 1. flat map `{ token: transcription }` (Japanese, Korean, old English),
//! 2. nested English map `{ word: { "accent": { "us": { "alpha": "..." },
//!    "uk": { "alpha": "..." } } } }`,
//! 3. prefix tree for Chinese longest-match (see [`crate::trie`]).
//!
//! The shape is selected per source at load time, so callers never branch
//! on format. A failed fetch or parse degrades that language to always-miss
//! lookups and never blocks the other languages; [`PronunciationLookup::get`]
//! returns `None` rather than erroring for every kind of miss.

use crate::error::{PhonotateError, PhonotateResult};
use crate::language::{Accent, Language};
use crate::tokenizer::is_separator_char;
use crate::trie::PrefixTree;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Asynchronous dictionary resource provider.
///
/// Implementations fetch the raw JSON text for one resource path. The
/// library ships a file-backed fetcher, an HTTP fetcher for remote accent
/// sources, and an in-memory fetcher for tests.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> PhonotateResult<String>;

    /// Name used in logs to identify which fetcher served a resource.
    fn fetcher_name(&self) -> &str;
}

/// Reads dictionary resources from a base directory on disk.
pub struct FileFetcher {
    base: PathBuf,
}

impl FileFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FileFetcher { base: base.into() }
    }
}

#[async_trait]
impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, path: &str) -> PhonotateResult<String> {
        let full = self.base.join(path);
        std::fs::read_to_string(&full).map_err(|e| {
            PhonotateError::ResourceLoad(format!("failed to read '{}': {}", full.display(), e))
        })
    }

    fn fetcher_name(&self) -> &str {
        "file"
    }
}

/// Fetches dictionary resources over HTTP, for remote accent sources.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> PhonotateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PhonotateError::ResourceLoad(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> PhonotateResult<String> {
        let response = self
            .client
            .get(path)
            .send()
            .await
            .map_err(|e| PhonotateError::ResourceLoad(format!("GET {} failed: {}", path, e)))?;
        if !response.status().is_success() {
            return Err(PhonotateError::ResourceLoad(format!(
                "GET {} returned {}",
                path,
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| PhonotateError::ResourceLoad(format!("reading {} failed: {}", path, e)))
    }

    fn fetcher_name(&self) -> &str {
        "http"
    }
}

/// In-memory fetcher for tests: serves pre-registered resources and fails
/// deterministically on everything else.
#[derive(Default)]
pub struct StaticFetcher {
    resources: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        StaticFetcher::default()
    }

    pub fn with_resource(mut self, path: &str, body: &str) -> Self {
        self.resources.insert(path.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl ResourceFetcher for StaticFetcher {
    async fn fetch(&self, path: &str) -> PhonotateResult<String> {
        self.resources.get(path).cloned().ok_or_else(|| {
            PhonotateError::ResourceLoad(format!("no static resource registered for '{}'", path))
        })
    }

    fn fetcher_name(&self) -> &str {
        "static"
    }
}

/// One dictionary resource to load, with its format adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// Flat `{ token: transcription }` map for one language.
    Flat { language: Language, path: String },
    /// Unified English file keyed by word with nested per-accent entries.
    AccentMap { path: String },
    /// Older English layout: one flat file per accent.
    PerAccentFlat { paths: Vec<(Accent, String)> },
    /// Nested character tree for logographic longest-match.
    PrefixTree { language: Language, path: String },
}

impl DictionarySource {
    fn language(&self) -> Language {
        match self {
            DictionarySource::Flat { language, .. } => *language,
            DictionarySource::AccentMap { .. } => Language::English,
            DictionarySource::PerAccentFlat { .. } => Language::English,
            DictionarySource::PrefixTree { language, .. } => *language,
        }
    }
}

/// Outcome of a load pass. Loading never fails as a whole; the report says
/// which languages came up empty and why.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<Language>,
    pub failed: Vec<(Language, String)>,
}

enum LanguageTable {
    Flat(HashMap<String, String>),
    Accented(HashMap<Accent, HashMap<String, String>>),
    Tree(PrefixTree),
}

/// Read-only after load. Missing language, accent bucket or token all
/// answer `None`.
#[derive(Default)]
pub struct PronunciationLookup {
    tables: HashMap<Language, LanguageTable>,
}

impl PronunciationLookup {
    pub fn new() -> Self {
        PronunciationLookup::default()
    }

    /// Fetch and parse every source. Each failure is logged, recorded in
    /// the report, and leaves that language with no data; other sources
    /// proceed regardless.
    pub async fn load(
        &mut self,
        fetcher: &dyn ResourceFetcher,
        sources: &[DictionarySource],
    ) -> LoadReport {
        let mut report = LoadReport::default();
        for source in sources {
            let language = source.language();
            match self.load_source(fetcher, source).await {
                Ok(table) => {
                    debug!(language = %language, fetcher = fetcher.fetcher_name(), "dictionary loaded");
                    self.tables.insert(language, table);
                    report.loaded.push(language);
                }
                Err(e) => {
                    warn!(language = %language, error = %e, "dictionary load failed, lookups degrade to miss");
                    report.failed.push((language, e.to_string()));
                }
            }
        }
        report
    }

    async fn load_source(
        &self,
        fetcher: &dyn ResourceFetcher,
        source: &DictionarySource,
    ) -> PhonotateResult<LanguageTable> {
        match source {
            DictionarySource::Flat { path, .. } => {
                let value = Self::fetch_json(fetcher, path).await?;
                Ok(LanguageTable::Flat(Self::parse_flat(&value)?))
            }
            DictionarySource::AccentMap { path } => {
                let value = Self::fetch_json(fetcher, path).await?;
                Ok(LanguageTable::Accented(Self::parse_accent_map(&value)?))
            }
            DictionarySource::PerAccentFlat { paths } => {
                let mut buckets = HashMap::new();
                for (accent, path) in paths {
                    let value = Self::fetch_json(fetcher, path).await?;
                    buckets.insert(*accent, Self::parse_flat(&value)?);
                }
                Ok(LanguageTable::Accented(buckets))
            }
            DictionarySource::PrefixTree { path, .. } => {
                let value = Self::fetch_json(fetcher, path).await?;
                Ok(LanguageTable::Tree(PrefixTree::from_json(&value)?))
            }
        }
    }

    async fn fetch_json(fetcher: &dyn ResourceFetcher, path: &str) -> PhonotateResult<Value> {
        let body = fetcher.fetch(path).await?;
        serde_json::from_str(&body)
            .map_err(|e| PhonotateError::ParseError(format!("invalid JSON in '{}': {}", path, e)))
    }

    /// Flat `{ token: transcription }`, skipping `@`-prefixed metadata keys.
    fn parse_flat(value: &Value) -> PhonotateResult<HashMap<String, String>> {
        let obj = value.as_object().ok_or_else(|| {
            PhonotateError::ParseError("dictionary root must be an object".to_string())
        })?;
        let mut map = HashMap::new();
        for (key, value) in obj {
            if key.starts_with('@') {
                continue;
            }
            if let Some(s) = value.as_str() {
                map.insert(key.clone(), s.to_string());
            } else {
                warn!(key = %key, "dictionary entry is not a string, skipping");
            }
        }
        Ok(map)
    }

    /// Unified English shape: `word -> { "accent": { "us": { "alpha": t } } }`.
    fn parse_accent_map(value: &Value) -> PhonotateResult<HashMap<Accent, HashMap<String, String>>> {
        let obj = value.as_object().ok_or_else(|| {
            PhonotateError::ParseError("dictionary root must be an object".to_string())
        })?;
        let mut buckets: HashMap<Accent, HashMap<String, String>> = HashMap::new();
        for (word, entry) in obj {
            if word.starts_with('@') {
                continue;
            }
            let Some(accents) = entry.get("accent").and_then(|a| a.as_object()) else {
                continue;
            };
            for (accent_key, accent_entry) in accents {
                let accent = match accent_key.as_str() {
                    "us" => Accent::Us,
                    "uk" => Accent::Uk,
                    _ => continue,
                };
                let Some(alpha) = accent_entry.get("alpha").and_then(|a| a.as_str()) else {
                    continue;
                };
                buckets
                    .entry(accent)
                    .or_default()
                    .insert(word.clone(), alpha.to_string());
            }
        }
        Ok(buckets)
    }

    /// Look up one token. English keys are case-folded and stripped of
    /// surrounding punctuation before the lookup; every other language
    /// matches the token text exactly.
    pub fn get(&self, token: &str, language: Language, accent: Accent) -> Option<&str> {
        let table = self.tables.get(&language)?;
        match table {
            LanguageTable::Flat(map) => map.get(token).map(String::as_str),
            LanguageTable::Accented(buckets) => {
                let key = english_key(token);
                buckets.get(&accent)?.get(&key).map(String::as_str)
            }
            LanguageTable::Tree(tree) => tree.get(token),
        }
    }

    /// Expose the logographic trie so the tokenizer can drive longest-match
    /// segmentation from the same data the lookups use.
    pub fn prefix_tree(&self, language: Language) -> Option<&PrefixTree> {
        match self.tables.get(&language)? {
            LanguageTable::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Normalized English lookup key: lowercase, with leading and trailing
/// whitespace/punctuation removed. The token text itself is never altered,
/// so "Hello," still renders as "Hello," but looks up "hello".
fn english_key(token: &str) -> String {
    token.trim_matches(is_separator_char).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english_accent_source() -> (&'static str, &'static str) {
        (
            "data/en/data.json",
            r#"{
                "@metadata": {"source": "test"},
                "hello": {"accent": {"us": {"alpha": "həˈloʊ"}, "uk": {"alpha": "həˈləʊ"}}},
                "world": {"accent": {"us": {"alpha": "wɝld"}}}
            }"#,
        )
    }

    async fn loaded_lookup() -> (PronunciationLookup, LoadReport) {
        let (en_path, en_body) = english_accent_source();
        let fetcher = StaticFetcher::new()
            .with_resource(en_path, en_body)
            .with_resource("data/ja/data.json", r#"{"ひ": "hi", "カタカナ": "katakana"}"#)
            .with_resource("data/cn/data.json", r#"{"北": {"_": "běi", "京": {"_": ["běi", "jīng"]}}}"#);
        let sources = vec![
            DictionarySource::AccentMap {
                path: en_path.to_string(),
            },
            DictionarySource::Flat {
                language: Language::Japanese,
                path: "data/ja/data.json".to_string(),
            },
            DictionarySource::PrefixTree {
                language: Language::Chinese,
                path: "data/cn/data.json".to_string(),
            },
        ];
        let mut lookup = PronunciationLookup::new();
        let report = lookup.load(&fetcher, &sources).await;
        (lookup, report)
    }

    #[tokio::test]
    async fn test_load_and_get_across_formats() {
        let (lookup, report) = loaded_lookup().await;
        assert_eq!(report.loaded.len(), 3);
        assert!(report.failed.is_empty());

        assert_eq!(
            lookup.get("hello", Language::English, Accent::Us),
            Some("həˈloʊ")
        );
        assert_eq!(
            lookup.get("hello", Language::English, Accent::Uk),
            Some("həˈləʊ")
        );
        assert_eq!(lookup.get("ひ", Language::Japanese, Accent::Standard), Some("hi"));
        assert_eq!(
            lookup.get("北京", Language::Chinese, Accent::Standard),
            Some("běi jīng")
        );
    }

    #[tokio::test]
    async fn test_english_lookup_is_case_insensitive() {
        let (lookup, _) = loaded_lookup().await;
        assert_eq!(
            lookup.get("Hello", Language::English, Accent::Us),
            lookup.get("hello", Language::English, Accent::Us)
        );
    }

    #[tokio::test]
    async fn test_english_lookup_strips_surrounding_punctuation() {
        let (lookup, _) = loaded_lookup().await;
        assert_eq!(
            lookup.get("Hello,", Language::English, Accent::Us),
            Some("həˈloʊ")
        );
        assert_eq!(
            lookup.get("\"world\"", Language::English, Accent::Us),
            Some("wɝld")
        );
    }

    #[tokio::test]
    async fn test_missing_accent_bucket_is_a_miss() {
        let (lookup, _) = loaded_lookup().await;
        assert_eq!(lookup.get("world", Language::English, Accent::Uk), None);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_single_language() {
        let (en_path, en_body) = english_accent_source();
        // Korean resource is not registered, so its fetch fails
        let fetcher = StaticFetcher::new().with_resource(en_path, en_body);
        let sources = vec![
            DictionarySource::AccentMap {
                path: en_path.to_string(),
            },
            DictionarySource::Flat {
                language: Language::Korean,
                path: "data/ko/data.json".to_string(),
            },
        ];
        let mut lookup = PronunciationLookup::new();
        let report = lookup.load(&fetcher, &sources).await;

        assert_eq!(report.loaded, vec![Language::English]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Language::Korean);

        // Degraded language always misses; others are unaffected
        assert_eq!(lookup.get("한", Language::Korean, Accent::Standard), None);
        assert!(lookup.get("hello", Language::English, Accent::Us).is_some());
    }

    #[tokio::test]
    async fn test_malformed_json_degrades_to_miss() {
        let fetcher = StaticFetcher::new().with_resource("data/ja/data.json", "not json");
        let sources = vec![DictionarySource::Flat {
            language: Language::Japanese,
            path: "data/ja/data.json".to_string(),
        }];
        let mut lookup = PronunciationLookup::new();
        let report = lookup.load(&fetcher, &sources).await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(lookup.get("ひ", Language::Japanese, Accent::Standard), None);
    }

    #[tokio::test]
    async fn test_per_accent_flat_layout() {
        let fetcher = StaticFetcher::new()
            .with_resource("us.json", r#"{"hello": "həˈloʊ"}"#)
            .with_resource("uk.json", r#"{"hello": "həˈləʊ"}"#);
        let sources = vec![DictionarySource::PerAccentFlat {
            paths: vec![
                (Accent::Us, "us.json".to_string()),
                (Accent::Uk, "uk.json".to_string()),
            ],
        }];
        let mut lookup = PronunciationLookup::new();
        lookup.load(&fetcher, &sources).await;
        assert_eq!(
            lookup.get("hello", Language::English, Accent::Us),
            Some("həˈloʊ")
        );
        assert_eq!(
            lookup.get("hello", Language::English, Accent::Uk),
            Some("həˈləʊ")
        );
    }

    #[test]
    fn test_lookup_before_load_misses() {
        let lookup = PronunciationLookup::new();
        assert_eq!(lookup.get("hello", Language::English, Accent::Us), None);
    }
}
