// Errors raised while talking to the fooocus.one prediction API.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The remote answered with a non-2xx status. The status is carried in the
    /// message only; callers never mirror it as their own response status.
    #[error("External API responded with status: {status}")]
    Status { status: StatusCode },

    #[error("Request to external API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to obtain prediction ID")]
    MissingPredictionId,

    #[error("Upscale failed at external API{}", failure_detail(.detail))]
    PredictionFailed { detail: Option<String> },

    #[error("Upscale took too long at external API (timed out after {attempts} polls)")]
    TimedOut { attempts: u32 },

    #[error("External API returned no output")]
    MissingOutput,
}

fn failure_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => format!(": {}", detail.trim()),
        _ => String::new(),
    }
}
