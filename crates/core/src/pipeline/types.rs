use serde::{Deserialize, Serialize};

use crate::translation::LanguagePair;

/// State of a translation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Created,
    Extracting,
    Translating,
    Completed,
    Failed,
    Halted,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Halted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Extracting => "extracting",
            Self::Translating => "translating",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Halted => "halted",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to translate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    /// Identifier used in events and logs.
    pub id: String,
    pub languages: LanguagePair,
    /// Fixed domain, or `None` to detect it from the first batch.
    pub domain: Option<String>,
}

impl TranslationJob {
    pub fn new(id: impl Into<String>, languages: LanguagePair) -> Self {
        Self {
            id: id.into(),
            languages,
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// A finished translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedDocument {
    /// Reassembled document bytes.
    pub document: Vec<u8>,
    /// Domain used for the job.
    pub domain: Option<String>,
    pub segment_count: usize,
    pub translated_segments: usize,
}

/// How a job ended without failing.
///
/// A halted job produces no document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(TranslatedDocument),
    Halted,
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed(_) => JobState::Completed,
            Self::Halted => JobState::Halted,
        }
    }
}
