//! Trait definitions for the translation module.

use async_trait::async_trait;

use super::error::TranslationError;
use super::types::{TranslationRequest, TranslationResult};

/// A stateless adapter for the remote translation endpoint.
///
/// Every call to [`translate_batch`](TranslationClient::translate_batch)
/// performs exactly one network request and has no other side effects.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Returns the name of this client implementation.
    fn name(&self) -> &str;

    /// Translates one batch of texts.
    async fn translate_batch(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError>;
}
