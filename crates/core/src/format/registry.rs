use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::error::FormatError;
use super::plain_text::PlainTextFormat;
use super::traits::DocumentFormat;

/// Maps file extensions to document formats.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn DocumentFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("txt", Arc::new(PlainTextFormat::new()));
        registry
    }
}

impl FormatRegistry {
    /// Registry with the built-in formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry without any format.
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Register `format` for `extension` (case-insensitive, leading dot optional).
    pub fn register(&mut self, extension: &str, format: Arc<dyn DocumentFormat>) {
        self.formats.insert(normalize(extension), format);
    }

    pub fn resolve(&self, extension: &str) -> Result<Arc<dyn DocumentFormat>, FormatError> {
        self.formats
            .get(&normalize(extension))
            .cloned()
            .ok_or_else(|| FormatError::UnknownFileType(extension.to_string()))
    }

    /// Resolve the format for a file by its extension.
    pub fn resolve_path(&self, path: &Path) -> Result<Arc<dyn DocumentFormat>, FormatError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FormatError::UnknownFileType(path.display().to_string()))?;
        self.resolve(extension)
    }

    pub fn extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.formats.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
