// HTTP implementation of UpscaleBackend for fooocus.one.

use super::{
    UpscaleBackend,
    error::UpstreamError,
    models::{
        CreatePredictionRequest, CreatePredictionResponse, DEFAULT_MODEL_VERSION,
        PredictionInput, PredictionStatus, UpscaleJob,
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ORIGIN, REFERER};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://fooocus.one";
pub const DEFAULT_USER_AGENT: &str = "Raol-APIs/2.0.0";
const REFERER_PATH: &str = "/id/apps/batch-upscale-image";

#[derive(Debug, Clone)]
pub struct FooocusClientConfig {
    /// Scheme and host of the API, without a trailing path.
    pub base_url: String,
    pub model_version: String,
    pub user_agent: String,
    /// Bound on each submit and poll call.
    pub request_timeout: Duration,
    /// Bound on the download of the finished image.
    pub download_timeout: Duration,
}

impl Default for FooocusClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(60),
            download_timeout: Duration::from_secs(60),
        }
    }
}

pub struct FooocusClient {
    http_client: reqwest::Client,
    config: FooocusClientConfig,
    origin: String,
    referer: String,
}

impl Debug for FooocusClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FooocusClient")
            .field("base_url", &self.config.base_url)
            .field("model_version", &self.config.model_version)
            .finish()
    }
}

impl FooocusClient {
    pub fn new(config: FooocusClientConfig) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        let origin = config.base_url.trim_end_matches('/').to_string();
        let referer = format!("{}{}", origin, REFERER_PATH);

        Ok(Self {
            http_client,
            config,
            origin,
            referer,
        })
    }

    fn predictions_url(&self) -> String {
        format!("{}/api/predictions", self.origin)
    }
}

// Turns a non-2xx response into UpstreamError::Status, logging whatever body
// the remote sent along.
async fn ensure_success(
    response: reqwest::Response,
    operation: &str,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(
        operation,
        status = %status,
        body = %body,
        "External API returned an error status"
    );
    Err(UpstreamError::Status { status })
}

#[async_trait]
impl UpscaleBackend for FooocusClient {
    async fn submit(&self, job: &UpscaleJob) -> Result<String, UpstreamError> {
        let request = CreatePredictionRequest {
            version: &self.config.model_version,
            input: PredictionInput {
                face_enhance: job.face_enhance,
                image: job.image_data_uri(),
                scale: job.scale,
            },
        };

        let response = self
            .http_client
            .post(self.predictions_url())
            .timeout(self.config.request_timeout)
            .header(ORIGIN, &self.origin)
            .header(REFERER, &self.referer)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response, "submit").await?;

        let created: CreatePredictionResponse = response.json().await?;
        created
            .into_prediction_id()
            .ok_or(UpstreamError::MissingPredictionId)
    }

    async fn poll(&self, prediction_id: &str) -> Result<PredictionStatus, UpstreamError> {
        let url = format!("{}/{}", self.predictions_url(), prediction_id);

        let response = self
            .http_client
            .get(&url)
            .timeout(self.config.request_timeout)
            .header(REFERER, &self.referer)
            .send()
            .await?;
        let response = ensure_success(response, "poll").await?;

        Ok(response.json().await?)
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, UpstreamError> {
        debug!(url, "Downloading upscaled image");

        let response = self
            .http_client
            .get(url)
            .timeout(self.config.download_timeout)
            .send()
            .await?;
        let response = ensure_success(response, "fetch").await?;

        Ok(response.bytes().await?)
    }
}
