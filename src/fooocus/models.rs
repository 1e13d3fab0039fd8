// Wire types for the fooocus.one prediction API.

use base64::prelude::{BASE64_STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Model version hash of the upscaler the relay submits to.
pub const DEFAULT_MODEL_VERSION: &str =
    "f121d640bd286e1fdc67f9799164c1d5be36ff74576ee11c803ae5b665dd46aa";

/// One upscale submission. The image must already be JPEG encoded.
#[derive(Debug, Clone)]
pub struct UpscaleJob {
    pub image_jpeg: Bytes,
    pub scale: u32,
    pub face_enhance: bool,
}

impl UpscaleJob {
    /// The image as the `data:` URI the remote expects in `input.image`.
    pub fn image_data_uri(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            BASE64_STANDARD.encode(&self.image_jpeg)
        )
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CreatePredictionRequest<'a> {
    pub version: &'a str,
    pub input: PredictionInput,
}

#[derive(Debug, Serialize)]
pub(super) struct PredictionInput {
    pub face_enhance: bool,
    pub image: String,
    pub scale: u32,
}

// Submission responses are wrapped: `{"data": {"id": "..."}}`.
#[derive(Debug, Deserialize)]
pub(super) struct CreatePredictionResponse {
    #[serde(default)]
    pub data: Option<CreatedPrediction>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedPrediction {
    #[serde(default)]
    pub id: Option<String>,
}

impl CreatePredictionResponse {
    pub fn into_prediction_id(self) -> Option<String> {
        self.data
            .and_then(|data| data.id)
            .filter(|id| !id.trim().is_empty())
    }
}

/// Remote job status. Anything that is neither `succeeded` nor `failed`
/// (`starting`, `processing`, null, unknown values) counts as still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded,
    Failed,
    Pending,
}

// Pending responses carry whatever the remote likes in `status` and `output`
// (nulls, progress objects), so both stay raw JSON until the job succeeds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionStatus {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl PredictionStatus {
    pub fn job_status(&self) -> JobStatus {
        match self.status.as_ref().and_then(Value::as_str) {
            Some("succeeded") => JobStatus::Succeeded,
            Some("failed") => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }

    /// The URL to download: `output` itself when it is a string, otherwise
    /// the first element of a list.
    pub fn output_url(&self) -> Option<&str> {
        let url = match self.output.as_ref()? {
            Value::String(url) => Some(url.as_str()),
            Value::Array(items) => items.first().and_then(Value::as_str),
            _ => None,
        };
        url.filter(|url| !url.trim().is_empty())
    }

    pub fn error_detail(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}
