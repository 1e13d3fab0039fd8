// Client side of the fooocus.one prediction API: submit an image, poll the
// prediction, download the result.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod models;
mod prediction;

pub use client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FooocusClient, FooocusClientConfig};
pub use error::UpstreamError;
pub use models::{DEFAULT_MODEL_VERSION, PredictionStatus, UpscaleJob};
pub use prediction::{DEFAULT_MAX_POLL_ATTEMPTS, PollPolicy, run_prediction};

use async_trait::async_trait;
use bytes::Bytes;

/// The three remote operations an upscale needs. Implemented over HTTP by
/// [`FooocusClient`]; tests substitute a scripted fake.
#[async_trait]
pub trait UpscaleBackend: Send + Sync {
    /// Starts a prediction and returns its id.
    async fn submit(&self, job: &UpscaleJob) -> Result<String, UpstreamError>;

    /// Reads the current state of a prediction.
    async fn poll(&self, prediction_id: &str) -> Result<PredictionStatus, UpstreamError>;

    /// Downloads the bytes behind an output URL.
    async fn fetch(&self, url: &str) -> Result<Bytes, UpstreamError>;
}
