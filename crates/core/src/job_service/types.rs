//! Types for the job service module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::translation::LanguagePair;

/// Task status as stored by the file translation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Initializing,
    Extracting,
    Translating,
    Saving,
    Completed,
    Error,
    Cancelled,
}

/// Detail for the `error` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskSubstatus {
    #[default]
    Unspecified,
    BadFileError,
    UnknownFileTypeError,
    NoTextExtractedError,
    TranslationFailedError,
    UnknownError,
}

/// Category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileCategory {
    Source,
    SourceConverted,
    Translated,
    TranslatedConverted,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::SourceConverted => "SourceConverted",
            Self::Translated => "Translated",
            Self::TranslatedConverted => "TranslatedConverted",
        }
    }
}

/// A file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    pub id: String,
    /// Category name; kept as text since the service knows more than we upload.
    pub category: String,
    /// Extension including the leading dot, e.g. ".txt".
    pub extension: String,
}

impl TaskFile {
    pub fn is_category(&self, category: FileCategory) -> bool {
        self.category == category.as_str()
    }

    /// Name the file is stored under locally, e.g. "Source.txt".
    pub fn storage_name(&self) -> String {
        format!("{}{}", self.category, self.extension)
    }
}

/// Task metadata as returned by `GET {url}/file/{task}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetadata {
    pub src_lang: String,
    pub trg_lang: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub segments: usize,
    #[serde(default)]
    pub translated_segments: usize,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub substatus: TaskSubstatus,
    #[serde(default)]
    pub files: Vec<TaskFile>,
}

impl TaskMetadata {
    pub fn languages(&self) -> LanguagePair {
        LanguagePair::new(&self.src_lang, &self.trg_lang)
    }

    /// Domain to translate in, if one was chosen.
    pub fn fixed_domain(&self) -> Option<String> {
        self.domain.clone().filter(|d| !d.trim().is_empty())
    }

    pub fn source_file(&self) -> Option<&TaskFile> {
        self.files.iter().find(|f| f.is_category(FileCategory::Source))
    }

    /// Merge `update` into this metadata.
    pub fn apply(&mut self, update: &MetadataUpdate) {
        if let Some(segments) = update.segments {
            self.segments = segments;
        }
        if let Some(translated) = update.translated_segments {
            self.translated_segments = translated;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(substatus) = update.substatus {
            self.substatus = substatus;
        }
        if let Some(ref domain) = update.domain {
            self.domain = Some(domain.clone());
        }
    }

    /// Body of `PUT {url}/file/{task}`.
    pub fn to_payload(&self) -> MetadataPayload {
        MetadataPayload {
            segments: self.segments,
            translated_segments: self.translated_segments,
            status: self.status,
            substatus: self.substatus,
            domain: self.domain.clone(),
        }
    }
}

/// Full metadata update sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPayload {
    pub segments: usize,
    pub translated_segments: usize,
    pub status: TaskStatus,
    pub substatus: TaskSubstatus,
    pub domain: Option<String>,
}

/// Partial update; unset fields keep their last known value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub segments: Option<usize>,
    pub translated_segments: Option<usize>,
    pub status: Option<TaskStatus>,
    pub substatus: Option<TaskSubstatus>,
    pub domain: Option<String>,
}

impl MetadataUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn error(substatus: TaskSubstatus) -> Self {
        Self {
            status: Some(TaskStatus::Error),
            substatus: Some(substatus),
            ..Default::default()
        }
    }

    pub fn with_translated_segments(mut self, translated: usize) -> Self {
        self.translated_segments = Some(translated);
        self
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = Some(segments);
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A source file saved locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    /// File name, e.g. "Source.txt".
    pub storage_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> TaskMetadata {
        serde_json::from_value(json!({
            "srcLang": "en",
            "trgLang": "lv",
            "domain": null,
            "segments": 0,
            "translatedSegments": 0,
            "status": "initializing",
            "substatus": "Unspecified",
            "files": [
                { "id": "f1", "category": "Source", "extension": ".txt" },
                { "id": "f2", "category": "UnknownWordFile", "extension": ".doc" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_metadata() {
        let meta = metadata();
        assert_eq!(meta.languages(), LanguagePair::new("en", "lv"));
        assert_eq!(meta.status, TaskStatus::Initializing);
        assert_eq!(meta.source_file().unwrap().storage_name(), "Source.txt");
        assert_eq!(meta.fixed_domain(), None);
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut meta = metadata();
        meta.apply(&MetadataUpdate::status(TaskStatus::Translating).with_segments(12));
        meta.apply(&MetadataUpdate::default().with_translated_segments(5).with_domain("legal"));

        let payload = serde_json::to_value(meta.to_payload()).unwrap();
        assert_eq!(
            payload,
            json!({
                "segments": 12,
                "translatedSegments": 5,
                "status": "translating",
                "substatus": "Unspecified",
                "domain": "legal"
            })
        );
    }

    #[test]
    fn test_error_update() {
        let update = MetadataUpdate::error(TaskSubstatus::NoTextExtractedError);
        assert_eq!(update.status, Some(TaskStatus::Error));
        assert!(!update.is_empty());
        assert!(MetadataUpdate::default().is_empty());
        assert_eq!(
            serde_json::to_value(TaskSubstatus::NoTextExtractedError).unwrap(),
            "NoTextExtractedError"
        );
    }
}
