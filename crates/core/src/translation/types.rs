//! Types for the translation module.

use serde::{Deserialize, Serialize};

/// Kind of text submitted to the translation endpoint.
///
/// Sent over the wire as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    Plain,
    #[default]
    Document,
    Web,
    Asr,
}

impl TextType {
    /// Integer code understood by the translation endpoint.
    pub fn code(&self) -> u8 {
        match self {
            Self::Plain => 0,
            Self::Document => 1,
            Self::Web => 2,
            Self::Asr => 3,
        }
    }
}

/// One translation call: an ordered list of texts in a language pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub source_lang: String,
    pub target_lang: String,
    /// Domain to translate in. `None` lets the service detect it.
    pub domain: Option<String>,
    pub texts: Vec<String>,
    pub text_type: TextType,
}

/// Result of one translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// Translations in the same order as the request texts.
    pub translations: Vec<String>,
    /// Domain the service used for this request, if it reported one.
    pub domain: Option<String>,
}

/// Source/target language pair of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
