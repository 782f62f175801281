use thiserror::Error;

/// Errors raised by document formats.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The document cannot be read by its format.
    #[error("Bad file: {0}")]
    BadFile(String),

    /// No format is registered for the file extension.
    #[error("Unknown file type: {0}")]
    UnknownFileType(String),

    /// Translated lines do not fit the document.
    #[error("Reassembly failed: {0}")]
    Reassembly(String),
}

impl FormatError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadFile(_) => "bad_file",
            Self::UnknownFileType(_) => "unknown_file_type",
            Self::Reassembly(_) => "reassembly",
        }
    }
}
