//! Dispatch run: bounded worker pool with ordered result delivery.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::segmenter::{Batch, Segment};
use crate::translation::{
    LanguagePair, TextType, TranslationClient, TranslationError, TranslationRequest,
    TranslationResult,
};

use super::breaker::CircuitBreaker;
use super::config::DispatcherConfig;
use super::error::DispatchError;
use super::stop::StopHandle;

/// Translations for one batch, in the batch's segment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    /// Position of the batch in submission order.
    pub batch_index: usize,
    pub segment_indices: Vec<usize>,
    pub translations: Vec<String>,
}

/// Drives batches through a [`TranslationClient`].
pub struct Dispatcher {
    client: Arc<dyn TranslationClient>,
    config: DispatcherConfig,
    text_type: TextType,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn TranslationClient>, config: DispatcherConfig) -> Self {
        Self {
            client,
            config,
            text_type: TextType::default(),
        }
    }

    /// Sets the text type sent with every request.
    pub fn with_text_type(mut self, text_type: TextType) -> Self {
        self.text_type = text_type;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Prepare a run over `batches`.
    ///
    /// Nothing is sent until the first call to [`DispatchRun::next`]. When
    /// `domain` is `None` the first batch is translated before the pool starts
    /// and the domain it reports is used for every other batch.
    pub fn run(
        &self,
        segments: &[Segment],
        batches: Vec<Batch>,
        languages: LanguagePair,
        domain: Option<String>,
        stop: StopHandle,
    ) -> DispatchRun {
        let pending: VecDeque<PendingBatch> = batches
            .into_iter()
            .enumerate()
            .map(|(index, batch)| PendingBatch {
                index,
                texts: batch.texts(segments),
                segment_indices: batch.segment_indices,
            })
            .collect();

        let context = RunContext {
            client: Arc::clone(&self.client),
            languages,
            text_type: self.text_type,
            max_attempts: self.config.max_attempts.max(1),
            cooldown: self.config.timeout_cooldown(),
            breaker: CircuitBreaker::new(self.config.failure_ceiling()),
            abort: stop.child_token(),
        };

        DispatchRun {
            context: Arc::new(context),
            stop,
            concurrency: self.config.concurrency.max(1),
            total_batches: pending.len(),
            domain,
            unstarted: Some(pending),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            in_order: VecDeque::new(),
            finished: false,
        }
    }
}

/// A batch that has not been handed to a worker yet.
struct PendingBatch {
    index: usize,
    segment_indices: Vec<usize>,
    texts: Vec<String>,
}

/// A queued batch plus the handle its result is delivered on.
struct BatchJob {
    batch: PendingBatch,
    reply: oneshot::Sender<Result<BatchOutput, DispatchError>>,
}

type BatchQueue = Arc<Mutex<VecDeque<BatchJob>>>;

/// State shared by the workers of one run.
struct RunContext {
    client: Arc<dyn TranslationClient>,
    languages: LanguagePair,
    text_type: TextType,
    max_attempts: u32,
    cooldown: Duration,
    breaker: CircuitBreaker,
    /// Cancelled by `stop()`, and by the run itself on failure or drop.
    abort: CancellationToken,
}

impl RunContext {
    /// Translate one batch, retrying per policy.
    async fn translate(
        &self,
        batch: &PendingBatch,
        domain: Option<&str>,
    ) -> Result<TranslationResult, DispatchError> {
        let request = TranslationRequest {
            source_lang: self.languages.source.clone(),
            target_lang: self.languages.target.clone(),
            domain: domain.map(String::from),
            texts: batch.texts.clone(),
            text_type: self.text_type,
        };

        let mut failed_attempts: u32 = 0;
        let mut last_error: Option<TranslationError> = None;

        loop {
            if self.abort.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }

            let failures = match self.breaker.check() {
                Ok(failures) => failures,
                Err(e) => {
                    error!(
                        batch = batch.index,
                        limit = self.breaker.ceiling(),
                        "Consecutive failure limit reached, aborting"
                    );
                    metrics::BREAKER_TRIPS.inc();
                    return Err(e);
                }
            };
            if failures > 0 {
                debug!(
                    batch = batch.index,
                    failures,
                    limit = self.breaker.ceiling(),
                    "Consecutive timeouts so far"
                );
            }

            match &last_error {
                None => debug!(
                    batch = batch.index,
                    segments = batch.texts.len(),
                    "Requesting batch translation"
                ),
                Some(e) => info!(
                    batch = batch.index,
                    attempt = failed_attempts + 1,
                    max_attempts = self.max_attempts,
                    error = %e,
                    "Retrying batch translation"
                ),
            }

            let started = Instant::now();
            let result = self.client.translate_batch(&request).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(result) => {
                    self.breaker.record_success();
                    metrics::TRANSLATION_REQUESTS
                        .with_label_values(&["success"])
                        .inc();
                    metrics::BATCH_DURATION
                        .with_label_values(&["success"])
                        .observe(elapsed);
                    return Ok(result);
                }
                Err(TranslationError::Timeout) => {
                    metrics::TRANSLATION_REQUESTS
                        .with_label_values(&["timeout"])
                        .inc();
                    metrics::BATCH_DURATION
                        .with_label_values(&["timeout"])
                        .observe(elapsed);
                    metrics::BATCH_RETRIES.with_label_values(&["timeout"]).inc();
                    warn!(
                        batch = batch.index,
                        cooldown_ms = self.cooldown.as_millis() as u64,
                        "Translation service timed out, cooling down"
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(self.cooldown) => {}
                        _ = self.abort.cancelled() => {}
                    }
                    self.breaker.record_timeout();
                    last_error = Some(TranslationError::Timeout);
                }
                Err(e) => {
                    metrics::TRANSLATION_REQUESTS
                        .with_label_values(&["error"])
                        .inc();
                    metrics::BATCH_DURATION
                        .with_label_values(&["error"])
                        .observe(elapsed);

                    failed_attempts += 1;
                    if failed_attempts >= self.max_attempts {
                        error!(
                            batch = batch.index,
                            attempts = failed_attempts,
                            error = %e,
                            "Batch translation failed"
                        );
                        return Err(DispatchError::RetryExhausted {
                            batch: batch.index,
                            attempts: failed_attempts,
                            last_error: e,
                        });
                    }

                    metrics::BATCH_RETRIES.with_label_values(&["error"]).inc();
                    warn!(
                        batch = batch.index,
                        attempt = failed_attempts,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Batch translation attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }
    }
}

/// Worker loop: pull batches in submission order until the queue is drained
/// or the run is aborted.
async fn worker(id: usize, context: Arc<RunContext>, queue: BatchQueue, domain: Option<String>) {
    debug!(worker = id, "Dispatch worker started");

    loop {
        if context.abort.is_cancelled() {
            break;
        }

        let job = queue.lock().await.pop_front();
        let Some(BatchJob { batch, reply }) = job else {
            break;
        };

        let result = context
            .translate(&batch, domain.as_deref())
            .await
            .map(|result| BatchOutput {
                batch_index: batch.index,
                segment_indices: batch.segment_indices,
                translations: result.translations,
            });

        // The receiver is gone once the run stopped yielding.
        let _ = reply.send(result);
    }

    debug!(worker = id, "Dispatch worker finished");
}

/// An in-progress dispatch: yields one result per batch, in submission order.
///
/// Single use. After a fatal error or a halt `next()` returns `None`.
/// Dropping the run aborts queued work.
pub struct DispatchRun {
    context: Arc<RunContext>,
    stop: StopHandle,
    concurrency: usize,
    total_batches: usize,
    domain: Option<String>,
    unstarted: Option<VecDeque<PendingBatch>>,
    queue: BatchQueue,
    in_order: VecDeque<oneshot::Receiver<Result<BatchOutput, DispatchError>>>,
    finished: bool,
}

impl DispatchRun {
    /// Resolved domain, once known.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    /// Next batch result in submission order.
    pub async fn next(&mut self) -> Option<Result<BatchOutput, DispatchError>> {
        if self.finished {
            return None;
        }
        if self.stop.is_stopped() {
            return Some(self.halt());
        }

        let result = match self.start().await {
            Some(first) => first,
            // Popped only once resolved so a dropped call keeps its slot.
            None => match self.in_order.front_mut() {
                Some(receiver) => {
                    let result = receiver.await.unwrap_or(Err(DispatchError::Cancelled));
                    self.in_order.pop_front();
                    result
                }
                None => {
                    self.finished = true;
                    return None;
                }
            },
        };

        if self.stop.is_stopped() {
            return Some(self.halt());
        }

        if result.is_err() {
            self.abort();
            self.finished = true;
        }
        Some(result)
    }

    /// Start the pool on first poll. Returns the first batch's result when it
    /// had to be translated up front to resolve the domain.
    ///
    /// Batches stay in `unstarted` until the domain is known, so dropping the
    /// returned future only costs a repeated request for the first batch.
    async fn start(&mut self) -> Option<Result<BatchOutput, DispatchError>> {
        let unstarted = self.unstarted.as_mut()?;

        let mut first = None;
        if self.domain.is_none() {
            if let Some(batch) = unstarted.front() {
                info!("No domain given, resolving it from the first batch");
                let result = match self.context.translate(batch, None).await {
                    Ok(result) => result,
                    Err(e) => return Some(Err(e)),
                };
                match &result.domain {
                    Some(domain) => info!(domain = %domain, "Domain resolved"),
                    None => warn!("Translation service reported no domain"),
                }
                self.domain = result.domain;
                if let Some(batch) = unstarted.pop_front() {
                    first = Some(Ok(BatchOutput {
                        batch_index: batch.index,
                        segment_indices: batch.segment_indices,
                        translations: result.translations,
                    }));
                }
            }
        }

        let pending = self.unstarted.take().unwrap_or_default();
        if pending.is_empty() {
            return first;
        }

        let workers = self.concurrency.min(pending.len());
        let mut jobs = VecDeque::with_capacity(pending.len());
        for batch in pending {
            let (reply, receiver) = oneshot::channel();
            jobs.push_back(BatchJob { batch, reply });
            self.in_order.push_back(receiver);
        }
        // No worker holds the queue yet, so it is replaced rather than locked.
        self.queue = Arc::new(Mutex::new(jobs));

        debug!(
            workers,
            batches = self.in_order.len(),
            "Starting dispatch workers"
        );
        for id in 0..workers {
            tokio::spawn(worker(
                id,
                Arc::clone(&self.context),
                Arc::clone(&self.queue),
                self.domain.clone(),
            ));
        }

        first
    }

    fn halt(&mut self) -> Result<BatchOutput, DispatchError> {
        info!("Dispatch halted");
        self.abort();
        self.finished = true;
        Err(DispatchError::Cancelled)
    }

    /// Stop workers from taking new batches and drop the queued ones.
    fn abort(&mut self) {
        self.context.abort.cancel();
        self.unstarted = None;
        if let Ok(mut queue) = self.queue.try_lock() {
            if !queue.is_empty() {
                debug!(dropped = queue.len(), "Dropped queued batches");
            }
            queue.clear();
        }
        self.in_order.clear();
    }
}

impl Drop for DispatchRun {
    fn drop(&mut self) {
        self.context.abort.cancel();
    }
}
