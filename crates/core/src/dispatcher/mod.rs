//! Dispatcher: drives batches through the translation client.
//!
//! A run translates batches with a bounded pool of workers and yields the
//! results strictly in submission order. It owns the retry policy, the
//! job-wide circuit breaker over consecutive timeouts, domain resolution and
//! cooperative cancellation through a [`StopHandle`].

mod breaker;
mod config;
mod error;
mod runner;
mod stop;

pub use breaker::CircuitBreaker;
pub use config::DispatcherConfig;
pub use error::DispatchError;
pub use runner::{BatchOutput, DispatchRun, Dispatcher};
pub use stop::StopHandle;
