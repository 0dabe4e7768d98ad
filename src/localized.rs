//! Bilingual text fields as stored in the catalog.
//!
//! Product and content rows carry their copy as JSON that is either a bare
//! string (legacy rows authored in Chinese) or a map of language code to
//! string (`{"zh": "...", "en": "..."}`). `LocalizedText` normalizes both
//! shapes behind one fallback rule so call sites never pick at raw JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language code used for authoring and as the last-resort fallback.
pub const FALLBACK_LANGUAGE: &str = "zh";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LocalizedTextRepr", into = "LocalizedTextRepr")]
pub struct LocalizedText {
    translations: BTreeMap<String, String>,
}

/// Wire shape: a bare string or a language-keyed map.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum LocalizedTextRepr {
    Plain(String),
    ByLanguage(BTreeMap<String, String>),
}

impl From<LocalizedTextRepr> for LocalizedText {
    fn from(repr: LocalizedTextRepr) -> Self {
        match repr {
            // Legacy rows store unwrapped Chinese copy
            LocalizedTextRepr::Plain(text) => LocalizedText::new(FALLBACK_LANGUAGE, text),
            LocalizedTextRepr::ByLanguage(translations) => LocalizedText { translations },
        }
    }
}

impl From<LocalizedText> for LocalizedTextRepr {
    fn from(text: LocalizedText) -> Self {
        LocalizedTextRepr::ByLanguage(text.translations)
    }
}

impl LocalizedText {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        let mut translations = BTreeMap::new();
        translations.insert(language.into(), text.into());
        Self { translations }
    }

    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(language.into(), text.into());
        self
    }

    /// Bilingual constructor for the common zh/en pair.
    pub fn bilingual(zh: impl Into<String>, en: impl Into<String>) -> Self {
        Self::new("zh", zh).with("en", en)
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Looks up the text for a language: requested language, then the
    /// primary subtag (`zh` for `zh-TW`), then `"zh"`, then the first
    /// available translation.
    pub fn get(&self, language: &str) -> Option<&str> {
        if let Some(text) = self.translations.get(language) {
            return Some(text);
        }
        if let Some(primary) = language.split('-').next() {
            if let Some(text) = self.translations.get(primary) {
                return Some(text);
            }
        }
        if let Some(text) = self.translations.get(FALLBACK_LANGUAGE) {
            return Some(text);
        }
        self.translations.values().next().map(String::as_str)
    }

    /// Infallible resolution; empty string only when no translation exists.
    pub fn resolve(&self, language: &str) -> &str {
        self.get(language).unwrap_or("")
    }

    /// Decode from an entity JSON column. Malformed JSON resolves to an
    /// empty value rather than failing the read path.
    pub fn from_json(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Self {
            translations: BTreeMap::new(),
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("map of strings always serializes")
    }
}
