//! Mock translation client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::translation::{TranslationClient, TranslationError, TranslationRequest, TranslationResult};

/// Computes the simulated latency of a request.
pub type LatencyFn = Arc<dyn Fn(&TranslationRequest) -> Duration + Send + Sync>;

/// Fails requests whose texts contain `marker`, `remaining` more times.
#[derive(Debug, Clone)]
struct FailureRule {
    marker: String,
    error: TranslationError,
    remaining: usize,
}

/// Mock implementation of the TranslationClient trait.
///
/// Provides controllable behavior for testing:
/// - Record every request, including failed ones
/// - Queue errors for the next calls
/// - Fail batches containing a marker text a number of times
/// - Script the domain reported per call
/// - Simulate latency (fixed or per request)
///
/// Successful calls translate each text to `{prefix}{text}`.
///
/// # Example
///
/// ```rust,ignore
/// use doctrans_core::testing::MockTranslationClient;
///
/// let client = MockTranslationClient::new();
/// client.fail_texts_containing("bad", TranslationError::Timeout, 2).await;
///
/// let dispatcher = Dispatcher::new(Arc::new(client.clone()), config);
/// // ...
/// assert_eq!(client.call_count().await, 4);
/// ```
#[derive(Clone)]
pub struct MockTranslationClient {
    /// Recorded requests in call order.
    requests: Arc<RwLock<Vec<TranslationRequest>>>,
    /// Errors returned by the next calls, in order.
    next_errors: Arc<RwLock<VecDeque<TranslationError>>>,
    failure_rules: Arc<RwLock<Vec<FailureRule>>>,
    /// Domain reported by call `n`; the last one repeats.
    domains: Arc<RwLock<Vec<String>>>,
    prefix: Arc<RwLock<String>>,
    latency: Arc<RwLock<Duration>>,
    latency_fn: Arc<RwLock<Option<LatencyFn>>>,
}

impl Default for MockTranslationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranslationClient {
    /// Create a new mock client reporting the "general" domain.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_errors: Arc::new(RwLock::new(VecDeque::new())),
            failure_rules: Arc::new(RwLock::new(Vec::new())),
            domains: Arc::new(RwLock::new(vec!["general".to_string()])),
            prefix: Arc::new(RwLock::new(String::new())),
            latency: Arc::new(RwLock::new(Duration::ZERO)),
            latency_fn: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<TranslationRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of calls made.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Queue an error for the next call.
    pub async fn push_error(&self, error: TranslationError) {
        self.next_errors.write().await.push_back(error);
    }

    /// Fail the next `times` requests containing a text with `marker`.
    pub async fn fail_texts_containing(
        &self,
        marker: impl Into<String>,
        error: TranslationError,
        times: usize,
    ) {
        self.failure_rules.write().await.push(FailureRule {
            marker: marker.into(),
            error,
            remaining: times,
        });
    }

    /// Set the domains reported by successive calls.
    pub async fn set_domains(&self, domains: Vec<&str>) {
        *self.domains.write().await = domains.into_iter().map(String::from).collect();
    }

    /// Set the prefix prepended to every translation.
    pub async fn set_prefix(&self, prefix: impl Into<String>) {
        *self.prefix.write().await = prefix.into();
    }

    /// Set a fixed latency for every call.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Compute latency per request.
    pub async fn set_latency_fn(&self, latency: LatencyFn) {
        *self.latency_fn.write().await = Some(latency);
    }

    async fn scripted_error(&self, request: &TranslationRequest) -> Option<TranslationError> {
        if let Some(error) = self.next_errors.write().await.pop_front() {
            return Some(error);
        }

        let mut rules = self.failure_rules.write().await;
        rules
            .iter_mut()
            .find(|rule| {
                rule.remaining > 0 && request.texts.iter().any(|t| t.contains(&rule.marker))
            })
            .map(|rule| {
                rule.remaining -= 1;
                rule.error.clone()
            })
    }
}

#[async_trait]
impl TranslationClient for MockTranslationClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate_batch(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        let call = {
            let mut requests = self.requests.write().await;
            requests.push(request.clone());
            requests.len() - 1
        };

        let latency = match self.latency_fn.read().await.as_ref() {
            Some(latency_fn) => latency_fn(request),
            None => *self.latency.read().await,
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.scripted_error(request).await {
            return Err(error);
        }

        let prefix = self.prefix.read().await.clone();
        let domain = {
            let domains = self.domains.read().await;
            domains
                .get(call.min(domains.len().saturating_sub(1)))
                .cloned()
        };

        Ok(TranslationResult {
            translations: request
                .texts
                .iter()
                .map(|t| format!("{}{}", prefix, t))
                .collect(),
            domain,
        })
    }
}
