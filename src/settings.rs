//! User preference snapshot passed into every core call
//!
//! The surrounding UI owns the settings. The core never persists them; each
//! annotation request receives the snapshot by reference, and the controller
//! replaces its copy wholesale when `apply_settings` arrives. Serde names
//! match the JSON the options page ships, e.g.
//! `{"enabledLanguages": {...}, "accent": {"english": "us"}, ...}`.

use crate::language::{Accent, Language};
use serde::{Deserialize, Serialize};

/// Modifier key that arms the hover trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Alt,
    Ctrl,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledLanguages {
    pub english: bool,
    pub chinese: bool,
    pub japanese: bool,
    pub korean: bool,
}

impl Default for EnabledLanguages {
    fn default() -> Self {
        EnabledLanguages {
            english: true,
            chinese: true,
            japanese: true,
            korean: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentSettings {
    pub english: Accent,
}

impl Default for AccentSettings {
    fn default() -> Self {
        AccentSettings {
            english: Accent::Us,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSettings {
    pub enabled: bool,
    pub modifier_key: ModifierKey,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        SelectionSettings {
            enabled: true,
            modifier_key: ModifierKey::Alt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enabled_languages: EnabledLanguages,
    pub accent: AccentSettings,
    pub selection: SelectionSettings,
    pub enable_phonetic_color: bool,
    /// Block-level elements whose text exceeds this length are rejected by
    /// the validity gate, preventing accidental whole-page annotation.
    pub max_block_text_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enabled_languages: EnabledLanguages::default(),
            accent: AccentSettings::default(),
            selection: SelectionSettings::default(),
            enable_phonetic_color: false,
            max_block_text_len: 1000,
        }
    }
}

impl Settings {
    pub fn language_enabled(&self, language: Language) -> bool {
        match language {
            Language::English => self.enabled_languages.english,
            Language::Chinese => self.enabled_languages.chinese,
            Language::Japanese => self.enabled_languages.japanese,
            Language::Korean => self.enabled_languages.korean,
            Language::Unknown => false,
        }
    }

    pub fn set_language_enabled(&mut self, language: Language, enabled: bool) {
        match language {
            Language::English => self.enabled_languages.english = enabled,
            Language::Chinese => self.enabled_languages.chinese = enabled,
            Language::Japanese => self.enabled_languages.japanese = enabled,
            Language::Korean => self.enabled_languages.korean = enabled,
            Language::Unknown => {}
        }
    }

    /// Accent used for lookups in the given language. Non-English languages
    /// always resolve to the single standard accent.
    pub fn accent_for(&self, language: Language) -> Accent {
        match language {
            Language::English => self.accent.english,
            _ => Accent::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.enabled_languages.english);
        assert!(settings.selection.enabled);
        assert_eq!(settings.selection.modifier_key, ModifierKey::Alt);
        assert_eq!(settings.accent.english, Accent::Us);
        assert!(!settings.enable_phonetic_color);
        assert_eq!(settings.max_block_text_len, 1000);
    }

    #[test]
    fn test_accent_is_fixed_for_non_english() {
        let mut settings = Settings::default();
        settings.accent.english = Accent::Uk;
        assert_eq!(settings.accent_for(Language::English), Accent::Uk);
        assert_eq!(settings.accent_for(Language::Japanese), Accent::Standard);
        assert_eq!(settings.accent_for(Language::Chinese), Accent::Standard);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let json = r#"{
            "enabledLanguages": {"english": true, "chinese": false, "japanese": true, "korean": true},
            "accent": {"english": "uk"},
            "selection": {"enabled": false, "modifierKey": "alt"},
            "enablePhoneticColor": true
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(!settings.enabled_languages.chinese);
        assert_eq!(settings.accent.english, Accent::Uk);
        assert!(!settings.selection.enabled);
        assert!(settings.enable_phonetic_color);
        // Omitted fields take defaults
        assert_eq!(settings.max_block_text_len, 1000);

        let back = serde_json::to_string(&settings).unwrap();
        let reparsed: Settings = serde_json::from_str(&back).unwrap();
        assert_eq!(settings, reparsed);
    }

    #[test]
    fn test_unknown_language_never_enabled() {
        assert!(!Settings::default().language_enabled(Language::Unknown));
    }
}
