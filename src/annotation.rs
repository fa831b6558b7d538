//! Annotated-token construction
//!
//! Pure transform from a token and its (possibly absent) transcription to an
//! immutable descriptor. No tree coupling: the document layer decides how a
//! descriptor becomes markup. When phoneme coloring is enabled, the
//! transcription splits into per-symbol spans classified against a static
//! phoneme table for the active accent; unmatched symbols render plain.

use crate::language::{Accent, Language};
use crate::settings::Settings;
use crate::tokenizer::Token;

/// Color/description class for one phoneme symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhonemeClass {
    pub color: &'static str,
    pub description: &'static str,
}

const LONG_VOWEL: PhonemeClass = PhonemeClass {
    color: "#FF6B6B",
    description: "long vowel as in 'fleece'",
};
const SHORT_VOWEL: PhonemeClass = PhonemeClass {
    color: "#FF6B6B",
    description: "short vowel as in 'kit'",
};
const NEUTRAL_VOWEL: PhonemeClass = PhonemeClass {
    color: "#D4D4D4",
    description: "schwa as in 'comma'",
};
const CONSONANT: PhonemeClass = PhonemeClass {
    color: "#FF9F9F",
    description: "consonant",
};
const DIPHTHONG_PART: PhonemeClass = PhonemeClass {
    color: "#FFB6C1",
    description: "part of a diphthong",
};

/// US-accent vowel symbols. The US set uses plain `i`/`u` where the UK set
/// writes length marks.
const US_VOWELS: &[(char, PhonemeClass)] = &[
    ('ɪ', SHORT_VOWEL),
    ('i', LONG_VOWEL),
    ('ʊ', SHORT_VOWEL),
    ('u', LONG_VOWEL),
    ('ɛ', SHORT_VOWEL),
    ('ə', NEUTRAL_VOWEL),
    ('ɝ', LONG_VOWEL),
    ('ɚ', NEUTRAL_VOWEL),
    ('ɔ', LONG_VOWEL),
    ('æ', SHORT_VOWEL),
    ('ʌ', SHORT_VOWEL),
    ('ɑ', LONG_VOWEL),
    ('e', DIPHTHONG_PART),
    ('o', DIPHTHONG_PART),
    ('a', DIPHTHONG_PART),
];

const UK_VOWELS: &[(char, PhonemeClass)] = &[
    ('ɪ', SHORT_VOWEL),
    ('i', LONG_VOWEL),
    ('ː', LONG_VOWEL),
    ('ʊ', SHORT_VOWEL),
    ('u', LONG_VOWEL),
    ('e', SHORT_VOWEL),
    ('ə', NEUTRAL_VOWEL),
    ('ɜ', LONG_VOWEL),
    ('ɒ', SHORT_VOWEL),
    ('ɔ', LONG_VOWEL),
    ('æ', SHORT_VOWEL),
    ('ʌ', SHORT_VOWEL),
    ('ɑ', LONG_VOWEL),
    ('a', DIPHTHONG_PART),
    ('o', DIPHTHONG_PART),
];

const CONSONANTS: &[char] = &[
    'p', 'b', 't', 'd', 'k', 'g', 'f', 'v', 's', 'z', 'm', 'n', 'l', 'r', 'w', 'j', 'h', 'θ',
    'ð', 'ʃ', 'ʒ', 'ʧ', 'ʤ', 'ŋ',
];

/// Classify one phoneme symbol against the accent's static table.
/// `None` means the symbol renders without color.
pub fn classify_phoneme(symbol: char, accent: Accent) -> Option<PhonemeClass> {
    let vowels = match accent {
        Accent::Uk => UK_VOWELS,
        _ => US_VOWELS,
    };
    if let Some((_, class)) = vowels.iter().find(|(c, _)| *c == symbol) {
        return Some(*class);
    }
    if CONSONANTS.contains(&symbol) {
        return Some(CONSONANT);
    }
    None
}

/// One symbol of a transcription, optionally colored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeSpan {
    pub symbol: String,
    pub class: Option<PhonemeClass>,
}

/// A transcription ready for display. `phonemes` is populated only when
/// phoneme coloring was requested at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub raw: String,
    pub phonemes: Option<Vec<PhonemeSpan>>,
}

/// Immutable record of one annotated token, produced per annotation pass
/// and discarded once the document reflects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedToken {
    pub text: String,
    pub language: Language,
    pub accent: Accent,
    pub transcription: Option<Transcription>,
}

/// Split a raw transcription into classified phoneme spans.
pub fn phoneme_spans(raw: &str, accent: Accent) -> Vec<PhonemeSpan> {
    raw.chars()
        .map(|c| PhonemeSpan {
            symbol: c.to_string(),
            class: classify_phoneme(c, accent),
        })
        .collect()
}

/// Build the descriptor for one token. Absent transcription still yields a
/// descriptor carrying the literal token text.
pub fn build(token: &Token, transcription: Option<&str>, settings: &Settings) -> AnnotatedToken {
    let accent = settings.accent_for(token.language);
    let transcription = transcription.map(|raw| Transcription {
        raw: raw.to_string(),
        phonemes: settings
            .enable_phonetic_color
            .then(|| phoneme_spans(raw, accent)),
    });
    AnnotatedToken {
        text: token.text.clone(),
        language: token.language,
        accent,
        transcription,
    }
}
