//! phonotate: pronunciation annotation engine
//!
//! Annotates document text with phonetic transcriptions for English,
//! Chinese, Japanese and Korean. The host resolves events down to a node
//! and a settings snapshot; the crate does the rest:
//!
//! 1. [`classify`] detects the language from script ranges,
//! 2. the [`tokenizer`] segments the text per language (longest prefix
//!    match against the dictionary trie for Chinese),
//! 3. [`PronunciationLookup`] answers transcriptions from per-language
//!    JSON dictionaries, degrading to misses when a resource failed,
//! 4. [`annotation::build`] produces annotated-token descriptors,
//! 5. [`DomAnnotator`] rewrites the node tree idempotently and can restore
//!    the original text exactly,
//! 6. [`TriggerController`] binds hover/selection triggers and the
//!    external commands.
//!
//! ```
//! use phonotate::{DomAnnotator, Element, Node, PronunciationLookup, Settings};
//!
//! let lookup = PronunciationLookup::new(); // no dictionaries loaded yet
//! let annotator = DomAnnotator::new(&lookup);
//! let mut node = Node::Element(Element::new("p").with_text("Hello, world!"));
//! annotator.annotate(&mut node, &Settings::default());
//! assert_eq!(node.text_content(), "Hello, world!");
//! annotator.restore(&mut node);
//! assert_eq!(node, Node::Text("Hello, world!".to_string()));
//! ```

pub mod annotation;
pub mod controller;
pub mod dom;
pub mod error;
pub mod language;
pub mod lookup;
pub mod selection;
pub mod settings;
pub mod tokenizer;
pub mod trie;

pub use annotation::{AnnotatedToken, PhonemeClass, PhonemeSpan, Transcription, build};
pub use controller::TriggerController;
pub use dom::{AnnotateOutcome, AnnotationState, DomAnnotator, Element, Node, is_valid_target};
pub use error::{PhonotateError, PhonotateResult};
pub use language::{Accent, Language, classify};
pub use lookup::{
    DictionarySource, FileFetcher, HttpFetcher, LoadReport, PronunciationLookup, ResourceFetcher,
    StaticFetcher,
};
pub use selection::{TextRange, expand};
pub use settings::{ModifierKey, Settings};
pub use tokenizer::{Token, segment, segment_graphemes, segment_longest_match};
pub use trie::PrefixTree;
