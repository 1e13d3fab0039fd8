// Drives one prediction from submission to downloaded result.

use super::{
    UpscaleBackend,
    error::UpstreamError,
    models::{JobStatus, UpscaleJob},
};
use bytes::Bytes;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Bound on the status loop: at most `max_attempts` polls, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Polls `prediction_id` until it succeeds, fails, or the policy runs out.
/// Returns the URL of the finished image.
pub async fn wait_for_output(
    backend: &dyn UpscaleBackend,
    prediction_id: &str,
    policy: PollPolicy,
) -> Result<String, UpstreamError> {
    for attempt in 1..=policy.max_attempts {
        let prediction = backend.poll(prediction_id).await?;

        match prediction.job_status() {
            JobStatus::Succeeded => {
                info!(
                    prediction_id,
                    attempts = attempt,
                    "Prediction completed successfully"
                );
                return prediction
                    .output_url()
                    .map(str::to_owned)
                    .ok_or(UpstreamError::MissingOutput);
            }
            JobStatus::Failed => {
                let detail = prediction.error_detail();
                warn!(prediction_id, attempts = attempt, ?detail, "Prediction failed");
                return Err(UpstreamError::PredictionFailed { detail });
            }
            JobStatus::Pending => {
                debug!(prediction_id, attempt, "Waiting for prediction to complete");
                // No point sleeping once the last poll has been spent.
                if attempt < policy.max_attempts {
                    sleep(policy.interval).await;
                }
            }
        }
    }

    Err(UpstreamError::TimedOut {
        attempts: policy.max_attempts,
    })
}

/// Submit, wait, download. Exactly one prediction per call.
pub async fn run_prediction(
    backend: &dyn UpscaleBackend,
    job: &UpscaleJob,
    policy: PollPolicy,
) -> Result<Bytes, UpstreamError> {
    let prediction_id = backend.submit(job).await?;
    info!(
        prediction_id = %prediction_id,
        scale = job.scale,
        face_enhance = job.face_enhance,
        "Prediction submitted, waiting for completion"
    );

    let output_url = wait_for_output(backend, &prediction_id, policy).await?;
    debug!(output_url = %output_url, "Fetching prediction output");

    backend.fetch(&output_url).await
}
