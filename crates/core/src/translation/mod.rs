//! Translation client for the remote machine-translation endpoint.
//!
//! This module provides the `TranslationClient` trait and an HTTP
//! implementation. A client performs one network call per batch and
//! classifies failures into timeouts (the service is busy) and transient
//! errors (everything else). Retry policy lives in the dispatcher.

mod error;
mod http;
mod traits;
mod types;

pub use error::TranslationError;
pub use http::HttpTranslationClient;
pub use traits::TranslationClient;
pub use types::{LanguagePair, TextType, TranslationRequest, TranslationResult};
