//! Trigger controller: event entry points and external commands
//!
//! The controller owns the loaded lookup and the current settings snapshot.
//! The surrounding host resolves raw browser events down to a target node
//! and calls in here; the messaging layer calls the four commands. All
//! settings mutations flow through these methods, so "latest settings win"
//! without any global mutable state.

use crate::annotation::{Transcription, phoneme_spans};
use crate::dom::{
    ATTR_ACCENT, ATTR_LANGUAGE, ATTR_ORIGIN, AnnotateOutcome, AnnotationState, CLASS_HIDDEN,
    CLASS_PROCESSED, CLASS_TOOLTIP, DomAnnotator, Element, Node, for_each_element_mut,
    is_valid_target, render_transcription,
};
use crate::language::{Accent, Language};
use crate::lookup::{DictionarySource, LoadReport, PronunciationLookup, ResourceFetcher};
use crate::selection::{TextRange, expand};
use crate::settings::{ModifierKey, Settings};
use tracing::debug;

/// Wrapper class around an annotated selection, preserving the original
/// run's position among its siblings.
pub const CLASS_SELECTION_WRAPPER: &str = "selected-text-wrapper";

pub struct TriggerController {
    lookup: PronunciationLookup,
    settings: Settings,
}

impl TriggerController {
    pub fn new(lookup: PronunciationLookup, settings: Settings) -> Self {
        TriggerController { lookup, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn lookup(&self) -> &PronunciationLookup {
        &self.lookup
    }

    /// Load dictionaries into the owned lookup. Annotation requests issued
    /// before this completes simply find no transcriptions.
    pub async fn load_dictionaries(
        &mut self,
        fetcher: &dyn ResourceFetcher,
        sources: &[DictionarySource],
    ) -> LoadReport {
        self.lookup.load(fetcher, sources).await
    }

    /// Modifier-key hover. Acts as a toggle: a fresh target is annotated in
    /// per-grapheme mode, an already-processed target is restored to its
    /// original text.
    pub fn handle_hover(&self, pressed: ModifierKey, target: &mut Node) -> AnnotateOutcome {
        if pressed != self.settings.selection.modifier_key {
            return AnnotateOutcome::Disabled;
        }
        if !is_valid_target(target, &self.settings) {
            return AnnotateOutcome::InvalidTarget;
        }
        let annotator = DomAnnotator::new(&self.lookup);
        if let Some(el) = target.as_element() {
            if el.state() == AnnotationState::Annotated || el.has_class(CLASS_PROCESSED) {
                return if annotator.restore(target) {
                    AnnotateOutcome::Restored
                } else {
                    AnnotateOutcome::AlreadyProcessed
                };
            }
        }
        annotator.annotate_graphemes(target, &self.settings)
    }

    /// Pointer-up selection. Expands English selections to whole words,
    /// wraps the selected run in a wrapper span, and annotates the wrapper,
    /// leaving the surrounding text of the target untouched.
    pub fn handle_selection(
        &self,
        target: &mut Node,
        range: TextRange,
        selected_text: &str,
    ) -> AnnotateOutcome {
        if !self.settings.selection.enabled {
            return AnnotateOutcome::Disabled;
        }
        if selected_text.trim().is_empty() {
            return AnnotateOutcome::EmptyText;
        }
        let parent_text = match target.as_element() {
            Some(el) => {
                if el.contains_annotation_markup() {
                    return AnnotateOutcome::AnnotationMarkup;
                }
                el.text_content()
            }
            None => return AnnotateOutcome::NotAnElement,
        };

        let range = expand(range, selected_text.trim(), &parent_text);
        let chars: Vec<char> = parent_text.chars().collect();
        let start = range.start.min(chars.len());
        let end = range.end.min(chars.len());
        if start >= end {
            return AnnotateOutcome::EmptyText;
        }

        let before: String = chars[..start].iter().collect();
        let middle: String = chars[start..end].iter().collect();
        let after: String = chars[end..].iter().collect();

        let mut wrapper = Node::Element(
            Element::new("span")
                .with_class(CLASS_SELECTION_WRAPPER)
                .with_text(&middle),
        );
        let outcome = DomAnnotator::new(&self.lookup).annotate(&mut wrapper, &self.settings);
        debug!(selected = %middle, outcome = ?outcome, "selection annotated");

        if let Some(el) = target.as_element_mut() {
            el.children.clear();
            if !before.is_empty() {
                el.children.push(Node::text(before));
            }
            el.children.push(wrapper);
            if !after.is_empty() {
                el.children.push(Node::text(after));
            }
        }
        outcome
    }

    /// Adopt a new settings snapshot and (re-)annotate every eligible
    /// text-bearing element under `document`. Returns how many elements
    /// were annotated; already-processed subtrees are left alone.
    pub fn apply_settings(&mut self, document: &mut Node, settings: Settings) -> usize {
        self.settings = settings;
        self.annotate_tree(document)
    }

    fn annotate_tree(&self, node: &mut Node) -> usize {
        enum Step {
            Skip,
            Annotate,
            Recurse,
        }
        let step = match node.as_element() {
            None => Step::Skip,
            Some(el) => {
                if matches!(el.tag.as_str(), "script" | "style")
                    || el.is_annotation_markup()
                    || el.state() == AnnotationState::Annotated
                    || el.has_class(CLASS_PROCESSED)
                {
                    Step::Skip
                } else if el
                    .children
                    .iter()
                    .any(|c| matches!(c, Node::Text(t) if !t.trim().is_empty()))
                {
                    Step::Annotate
                } else {
                    Step::Recurse
                }
            }
        };
        match step {
            Step::Skip => 0,
            Step::Annotate => {
                let annotator = DomAnnotator::new(&self.lookup);
                (annotator.annotate(node, &self.settings) == AnnotateOutcome::Annotated) as usize
            }
            Step::Recurse => {
                let Some(el) = node.as_element_mut() else {
                    return 0;
                };
                el.children
                    .iter_mut()
                    .map(|child| self.annotate_tree(child))
                    .sum()
            }
        }
    }

    /// Show or hide already-annotated transcriptions of one language
    /// without re-tokenizing anything. Returns the number of tooltips
    /// touched.
    pub fn toggle_language(
        &mut self,
        document: &mut Node,
        language: Language,
        enabled: bool,
    ) -> usize {
        self.settings.set_language_enabled(language, enabled);
        let mut count = 0;
        for_each_element_mut(document, &mut |el: &mut Element| {
            if el.has_class(CLASS_TOOLTIP) && el.attr(ATTR_LANGUAGE) == Some(language.as_str()) {
                if enabled {
                    el.remove_class(CLASS_HIDDEN);
                } else {
                    el.add_class(CLASS_HIDDEN);
                }
                count += 1;
            }
        });
        count
    }

    /// Switch the English accent: re-fetch the transcription of every
    /// annotated English word via its stored origin and replace the
    /// displayed transcription in place. Words missing from the new accent
    /// bucket keep their old transcription.
    pub fn update_accent(&mut self, document: &mut Node, accent: Accent) -> usize {
        self.settings.accent.english = accent;
        let lookup = &self.lookup;
        let enable_color = self.settings.enable_phonetic_color;
        let mut count = 0;
        for_each_element_mut(document, &mut |el: &mut Element| {
            if !el.has_class(CLASS_TOOLTIP)
                || el.attr(ATTR_LANGUAGE) != Some(Language::English.as_str())
            {
                return;
            }
            let Some(origin) = el.attr(ATTR_ORIGIN).map(str::to_string) else {
                return;
            };
            if let Some(raw) = lookup.get(&origin, Language::English, accent) {
                let transcription = Transcription {
                    raw: raw.to_string(),
                    phonemes: enable_color.then(|| phoneme_spans(raw, accent)),
                };
                el.children = render_transcription(&transcription);
                el.set_attr(ATTR_ACCENT, accent.as_str());
                count += 1;
            }
        });
        count
    }

    /// Re-render existing transcriptions with or without phoneme coloring,
    /// reading each tooltip's current text back as the raw transcription.
    pub fn update_phonetic_color(&mut self, document: &mut Node, enabled: bool) -> usize {
        self.settings.enable_phonetic_color = enabled;
        let mut count = 0;
        for_each_element_mut(document, &mut |el: &mut Element| {
            if !el.has_class(CLASS_TOOLTIP) {
                return;
            }
            let raw = el.text_content();
            if raw.is_empty() {
                return;
            }
            let accent = el
                .attr(ATTR_ACCENT)
                .map(Accent::from_tag)
                .unwrap_or(Accent::Standard);
            let transcription = Transcription {
                raw: raw.clone(),
                phonemes: enabled.then(|| phoneme_spans(&raw, accent)),
            };
            el.children = render_transcription(&transcription);
            count += 1;
        });
        count
    }
}
