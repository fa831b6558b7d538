//! Lightweight owned node tree and the idempotent annotator
//!
//! The crate does not talk to a live browser DOM; collaborators hand it a
//! [`Node`] tree, and annotation mutates that tree in place. An annotated
//! element carries the `pronunciation-processed` marker class, an explicit
//! [`AnnotationState`], and the verbatim pre-annotation text under
//! `data-original-text`, which together guarantee:
//!
//! - idempotence: a second `annotate` short-circuits on the marker,
//! - exact inversion: `restore` swaps the element for a text node holding
//!   the stored original text,
//! - exclusivity: check-and-set happens under one `&mut` borrow, so racing
//!   triggers on the same element cannot interleave.

use crate::annotation::{AnnotatedToken, Transcription, build};
use crate::language::{Language, classify};
use crate::lookup::PronunciationLookup;
use crate::settings::Settings;
use crate::tokenizer::{segment, segment_graphemes, segment_longest_match};
use crate::trie::PrefixTree;
use std::collections::BTreeMap;
use tracing::debug;

pub const CLASS_CONTAINER: &str = "pronunciation-container";
pub const CLASS_PROCESSED: &str = "pronunciation-processed";
pub const CLASS_WORD_CONTAINER: &str = "word-container";
pub const CLASS_WORD_TEXT: &str = "word-text";
pub const CLASS_TOOLTIP: &str = "pronunciation-tooltip";
pub const CLASS_HIDDEN: &str = "pronunciation-hidden";

pub const ATTR_ORIGINAL_TEXT: &str = "data-original-text";
pub const ATTR_LANGUAGE: &str = "data-language";
pub const ATTR_ACCENT: &str = "data-accent";
pub const ATTR_ORIGIN: &str = "data-origin";

/// Class names that identify annotation markup; anything carrying one of
/// these (or containing one) must never be re-annotated.
const ANNOTATION_CLASSES: &[&str] = &[
    CLASS_TOOLTIP,
    CLASS_WORD_TEXT,
    CLASS_CONTAINER,
    CLASS_HIDDEN,
    CLASS_WORD_CONTAINER,
];

/// Container tags rejected outright by the validity gate.
const ROOT_TAGS: &[&str] = &["body", "html"];

/// Block-level tags subject to the oversized-text gate.
const BLOCK_TAGS: &[&str] = &["div", "section", "article", "main"];

/// Per-element annotation lifecycle. `Annotated` is entered by `annotate`
/// and left only through `restore`, which destroys the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationState {
    #[default]
    Idle,
    Annotated,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
    state: AnnotationState,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Element::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::text(text));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn state(&self) -> AnnotationState {
        self.state
    }

    /// Concatenated text of all descendant text nodes, in tree order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.append_text(&mut out);
        }
        out
    }

    /// True when the element itself carries one of the annotation marker
    /// classes (tooltip, word wrapper, container).
    pub fn is_annotation_markup(&self) -> bool {
        ANNOTATION_CLASSES.iter().any(|c| self.has_class(c))
    }

    /// True when the element itself or any descendant is annotation markup.
    pub fn contains_annotation_markup(&self) -> bool {
        if self.is_annotation_markup() {
            return true;
        }
        self.children.iter().any(|child| match child {
            Node::Element(el) => el.contains_annotation_markup(),
            Node::Text(_) => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(text.into())
    }

    pub fn elem(element: Element) -> Node {
        Node::Element(element)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                for child in &el.children {
                    child.append_text(out);
                }
            }
        }
    }
}

impl std::fmt::Display for Node {
    /// Compact HTML-ish rendering with stable attribute order, used by the
    /// demo binary and by test assertions.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Text(t) => write!(f, "{}", t),
            Node::Element(el) => {
                write!(f, "<{}", el.tag)?;
                if !el.classes.is_empty() {
                    write!(f, " class=\"{}\"", el.classes.join(" "))?;
                }
                for (name, value) in &el.attributes {
                    write!(f, " {}=\"{}\"", name, value)?;
                }
                write!(f, ">")?;
                for child in &el.children {
                    write!(f, "{}", child)?;
                }
                write!(f, "</{}>", el.tag)
            }
        }
    }
}

/// Visit every element in the subtree, depth-first, parents before children.
pub fn for_each_element_mut<F: FnMut(&mut Element)>(node: &mut Node, f: &mut F) {
    if let Node::Element(el) = node {
        f(el);
        for child in el.children.iter_mut() {
            for_each_element_mut(child, f);
        }
    }
}

/// Why an annotation request was (or was not) applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateOutcome {
    Annotated,
    /// Hover on an annotated element restored it instead.
    Restored,
    AlreadyProcessed,
    NotAnElement,
    EmptyText,
    LanguageDisabled(Language),
    /// The target is (or contains) annotation markup.
    AnnotationMarkup,
    InvalidTarget,
    /// The trigger itself was not armed (feature off or wrong modifier).
    Disabled,
}

/// Applies and removes annotation on live tree nodes.
pub struct DomAnnotator<'a> {
    lookup: &'a PronunciationLookup,
}

impl<'a> DomAnnotator<'a> {
    pub fn new(lookup: &'a PronunciationLookup) -> Self {
        DomAnnotator { lookup }
    }

    /// Annotate a whole element: classify its text as one language,
    /// tokenize accordingly, and replace the children with annotated word
    /// wrappers. Trimming applies only to the emptiness check; the stored
    /// original text keeps every byte, so `restore` is an exact inverse.
    pub fn annotate(&self, node: &mut Node, settings: &Settings) -> AnnotateOutcome {
        let Some(el) = node.as_element_mut() else {
            return AnnotateOutcome::NotAnElement;
        };
        if el.state == AnnotationState::Annotated || el.has_class(CLASS_PROCESSED) {
            return AnnotateOutcome::AlreadyProcessed;
        }
        if el.contains_annotation_markup() {
            return AnnotateOutcome::AnnotationMarkup;
        }
        let text = el.text_content();
        if text.trim().is_empty() {
            return AnnotateOutcome::EmptyText;
        }
        let language = classify(&text);
        if !settings.language_enabled(language) {
            debug!(language = %language, "language disabled, skipping annotation");
            return AnnotateOutcome::LanguageDisabled(language);
        }

        let empty_tree;
        let tokens = if language == Language::Chinese {
            let tree = match self.lookup.prefix_tree(language) {
                Some(tree) => tree,
                None => {
                    empty_tree = PrefixTree::new();
                    &empty_tree
                }
            };
            segment_longest_match(&text, tree)
        } else {
            segment(&text, language)
        };

        let accent = settings.accent_for(language);
        let mut children = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if token.is_separator {
                children.push(Node::text(&token.text));
                continue;
            }
            let transcription = self.lookup.get(&token.text, token.language, accent);
            if transcription.is_none() {
                debug!(token = %token.text, language = %token.language, "no transcription found");
            }
            children.push(render_word(&build(token, transcription, settings)));
        }

        el.set_attr(ATTR_ORIGINAL_TEXT, &text);
        el.set_attr(ATTR_LANGUAGE, language.as_str());
        el.add_class(CLASS_CONTAINER);
        el.add_class(CLASS_PROCESSED);
        el.children = children;
        el.state = AnnotationState::Annotated;
        AnnotateOutcome::Annotated
    }

    /// Hover-mode annotation: per-character tokens classified individually,
    /// Latin runs grouped into words. Characters of disabled languages pass
    /// through as plain text.
    pub fn annotate_graphemes(&self, node: &mut Node, settings: &Settings) -> AnnotateOutcome {
        let Some(el) = node.as_element_mut() else {
            return AnnotateOutcome::NotAnElement;
        };
        if el.state == AnnotationState::Annotated || el.has_class(CLASS_PROCESSED) {
            return AnnotateOutcome::AlreadyProcessed;
        }
        if el.contains_annotation_markup() {
            return AnnotateOutcome::AnnotationMarkup;
        }
        let text = el.text_content();
        if text.trim().is_empty() {
            return AnnotateOutcome::EmptyText;
        }

        let mut children = Vec::new();
        for token in segment_graphemes(&text) {
            if token.is_separator || !settings.language_enabled(token.language) {
                children.push(Node::text(&token.text));
                continue;
            }
            let accent = settings.accent_for(token.language);
            let transcription = self.lookup.get(&token.text, token.language, accent);
            children.push(render_word(&build(&token, transcription, settings)));
        }

        el.set_attr(ATTR_ORIGINAL_TEXT, &text);
        el.add_class(CLASS_CONTAINER);
        el.add_class(CLASS_PROCESSED);
        el.children = children;
        el.state = AnnotationState::Annotated;
        AnnotateOutcome::Annotated
    }

    /// Exact inverse of annotation with respect to visible text: replace a
    /// processed element with a plain text node holding the stored original
    /// text. No-op (returns false) on anything else.
    pub fn restore(&self, node: &mut Node) -> bool {
        let original = match node.as_element() {
            Some(el)
                if (el.state == AnnotationState::Annotated || el.has_class(CLASS_PROCESSED)) =>
            {
                match el.attr(ATTR_ORIGINAL_TEXT) {
                    Some(text) => text.to_string(),
                    None => return false,
                }
            }
            _ => return false,
        };
        *node = Node::Text(original);
        true
    }
}

/// Shared validity gate for the hover and selection paths: reject
/// non-elements, empty text, root containers, and oversized block
/// containers (which would otherwise annotate most of a page at once).
pub fn is_valid_target(node: &Node, settings: &Settings) -> bool {
    let Some(el) = node.as_element() else {
        return false;
    };
    let text = el.text_content();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    if ROOT_TAGS.contains(&el.tag.as_str()) {
        return false;
    }
    if BLOCK_TAGS.contains(&el.tag.as_str())
        && trimmed.chars().count() > settings.max_block_text_len
    {
        return false;
    }
    true
}

/// Render one annotated token as a word wrapper: optional tooltip first,
/// then the literal token text.
pub fn render_word(annotated: &AnnotatedToken) -> Node {
    let mut word = Element::new("span").with_class(CLASS_WORD_CONTAINER);
    if let Some(transcription) = &annotated.transcription {
        let mut tooltip = Element::new("span").with_class(CLASS_TOOLTIP);
        tooltip.set_attr(ATTR_LANGUAGE, annotated.language.as_str());
        tooltip.set_attr(ATTR_ACCENT, annotated.accent.as_str());
        tooltip.set_attr(ATTR_ORIGIN, &annotated.text);
        tooltip.children = render_transcription(transcription);
        word.children.push(Node::Element(tooltip));
    }
    let text_span = Element::new("span")
        .with_class(CLASS_WORD_TEXT)
        .with_text(&annotated.text);
    word.children.push(Node::Element(text_span));
    Node::Element(word)
}

/// Tooltip contents: one sub-span per phoneme when coloring is on,
/// otherwise the raw transcription as a single text node.
pub fn render_transcription(transcription: &Transcription) -> Vec<Node> {
    match &transcription.phonemes {
        Some(spans) => spans
            .iter()
            .map(|span| {
                let mut ph = Element::new("span");
                if let Some(class) = span.class {
                    ph.set_attr("style", &format!("color: {}", class.color));
                    ph.set_attr("title", class.description);
                }
                ph.children.push(Node::text(&span.symbol));
                Node::Element(ph)
            })
            .collect(),
        None => vec![Node::text(&transcription.raw)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Accent;
    use crate::lookup::{DictionarySource, StaticFetcher};

    async fn test_lookup() -> PronunciationLookup {
        let fetcher = StaticFetcher::new()
            .with_resource(
                "en.json",
                r#"{"hello": {"accent": {"us": {"alpha": "həˈloʊ"}, "uk": {"alpha": "həˈləʊ"}}},
                    "world": {"accent": {"us": {"alpha": "wɝld"}}}}"#,
            )
            .with_resource("cn.json", r#"{"北": {"_": "běi", "京": {"_": "běi jīng"}}, "市": {"_": "shì"}}"#)
            .with_resource("ja.json", r#"{"ひらがな": "hiragana"}"#);
        let sources = vec![
            DictionarySource::AccentMap {
                path: "en.json".to_string(),
            },
            DictionarySource::PrefixTree {
                language: Language::Chinese,
                path: "cn.json".to_string(),
            },
            DictionarySource::Flat {
                language: Language::Japanese,
                path: "ja.json".to_string(),
            },
        ];
        let mut lookup = PronunciationLookup::new();
        lookup.load(&fetcher, &sources).await;
        lookup
    }

    fn paragraph(text: &str) -> Node {
        Node::Element(Element::new("p").with_text(text))
    }

    #[tokio::test]
    async fn test_annotate_english_structure() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();
        let mut node = paragraph("hello zzz");

        assert_eq!(annotator.annotate(&mut node, &settings), AnnotateOutcome::Annotated);
        let el = node.as_element().unwrap();
        assert!(el.has_class(CLASS_PROCESSED));
        assert!(el.has_class(CLASS_CONTAINER));
        assert_eq!(el.attr(ATTR_ORIGINAL_TEXT), Some("hello zzz"));
        assert_eq!(el.attr(ATTR_LANGUAGE), Some("english"));
        assert_eq!(el.state(), AnnotationState::Annotated);

        let rendered = node.to_string();
        // "hello" is in the dictionary, "zzz" is not
        assert!(rendered.contains("həˈloʊ"));
        assert!(rendered.contains(CLASS_TOOLTIP));
        // The miss still renders a word-text span, just without a tooltip
        assert!(rendered.contains(">zzz</span>"));
        // Tooltip text precedes the word text in tree order
        assert_eq!(node.text_content(), "həˈloʊhello zzz");
    }

    #[tokio::test]
    async fn test_annotate_is_idempotent() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();
        let mut node = paragraph("hello world");

        assert_eq!(annotator.annotate(&mut node, &settings), AnnotateOutcome::Annotated);
        let after_first = node.clone();
        assert_eq!(
            annotator.annotate(&mut node, &settings),
            AnnotateOutcome::AlreadyProcessed
        );
        assert_eq!(node, after_first);
    }

    #[tokio::test]
    async fn test_restore_is_exact_inverse() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();
        let text = "  hello \t world  ";
        let mut node = paragraph(text);

        annotator.annotate(&mut node, &settings);
        assert!(annotator.restore(&mut node));
        assert_eq!(node, Node::Text(text.to_string()));
    }

    #[tokio::test]
    async fn test_restore_noop_on_unprocessed() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let mut node = paragraph("hello");
        assert!(!annotator.restore(&mut node));
        let mut text_node = Node::text("hello");
        assert!(!annotator.restore(&mut text_node));
    }

    #[tokio::test]
    async fn test_annotate_skips_empty_and_disabled() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let mut settings = Settings::default();
        settings.enabled_languages.japanese = false;

        let mut empty = paragraph("   ");
        assert_eq!(annotator.annotate(&mut empty, &settings), AnnotateOutcome::EmptyText);

        let mut ja = paragraph("ひらがな");
        assert_eq!(
            annotator.annotate(&mut ja, &settings),
            AnnotateOutcome::LanguageDisabled(Language::Japanese)
        );
        // Skipped element is untouched
        assert_eq!(ja.text_content(), "ひらがな");
        assert!(!ja.as_element().unwrap().has_class(CLASS_PROCESSED));
    }

    #[tokio::test]
    async fn test_annotate_skips_annotation_markup() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();

        let mut tooltip = Node::Element(
            Element::new("span")
                .with_class(CLASS_TOOLTIP)
                .with_text("həˈloʊ"),
        );
        assert_eq!(
            annotator.annotate(&mut tooltip, &settings),
            AnnotateOutcome::AnnotationMarkup
        );

        // An element whose descendant is annotation markup is also rejected
        let mut parent = Node::Element(
            Element::new("p")
                .with_text("hello ")
                .with_child(Node::Element(
                    Element::new("span").with_class(CLASS_WORD_TEXT).with_text("world"),
                )),
        );
        assert_eq!(
            annotator.annotate(&mut parent, &settings),
            AnnotateOutcome::AnnotationMarkup
        );
    }

    #[tokio::test]
    async fn test_annotate_chinese_longest_match() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();
        let mut node = paragraph("北京市");

        annotator.annotate(&mut node, &settings);
        let rendered = node.to_string();
        assert!(rendered.contains("běi jīng"));
        assert!(rendered.contains("shì"));
        assert!(rendered.contains(">北京</span>"));
        assert!(!rendered.contains(">北</span>"));
    }

    #[tokio::test]
    async fn test_annotate_without_dictionary_still_succeeds() {
        let lookup = PronunciationLookup::new();
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();
        let mut node = paragraph("hello world");

        assert_eq!(annotator.annotate(&mut node, &settings), AnnotateOutcome::Annotated);
        let rendered = node.to_string();
        assert!(!rendered.contains(CLASS_TOOLTIP));
        assert!(rendered.contains(CLASS_WORD_TEXT));
        assert_eq!(node.text_content(), "hello world");
    }

    #[tokio::test]
    async fn test_grapheme_mode_mixed_text() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let settings = Settings::default();
        let mut node = paragraph("hello 北京");

        assert_eq!(
            annotator.annotate_graphemes(&mut node, &settings),
            AnnotateOutcome::Annotated
        );
        let rendered = node.to_string();
        assert!(rendered.contains("həˈloʊ"));
        // Per-character mode looks up single characters, not phrases
        assert!(rendered.contains("běi"));
        assert!(rendered.contains(">北</span>"));
        assert!(rendered.contains(">京</span>"));
    }

    #[tokio::test]
    async fn test_uk_accent_lookup() {
        let lookup = test_lookup().await;
        let annotator = DomAnnotator::new(&lookup);
        let mut settings = Settings::default();
        settings.accent.english = Accent::Uk;
        let mut node = paragraph("hello");

        annotator.annotate(&mut node, &settings);
        let rendered = node.to_string();
        assert!(rendered.contains("həˈləʊ"));
        assert!(rendered.contains("data-accent=\"uk\""));
    }

    #[test]
    fn test_validity_gate() {
        let settings = Settings::default();
        assert!(!is_valid_target(&Node::text("hello"), &settings));
        assert!(!is_valid_target(
            &Node::Element(Element::new("p")),
            &settings
        ));
        assert!(!is_valid_target(
            &Node::Element(Element::new("body").with_text("hello")),
            &settings
        ));
        assert!(is_valid_target(
            &Node::Element(Element::new("p").with_text("hello")),
            &settings
        ));

        let long_text = "a".repeat(settings.max_block_text_len + 1);
        assert!(!is_valid_target(
            &Node::Element(Element::new("div").with_text(&long_text)),
            &settings
        ));
        // The same text in an inline element is fine
        assert!(is_valid_target(
            &Node::Element(Element::new("span").with_text(&long_text)),
            &settings
        ));
    }

    #[test]
    fn test_display_rendering() {
        let node = Node::Element(
            Element::new("span")
                .with_class("word-text")
                .with_text("hi"),
        );
        assert_eq!(node.to_string(), "<span class=\"word-text\">hi</span>");
    }
}
