// Scripted in-memory backend for tests.

use super::{
    UpscaleBackend,
    error::UpstreamError,
    models::{PredictionStatus, UpscaleJob},
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

pub fn pending() -> PredictionStatus {
    PredictionStatus {
        status: Some(json!("processing")),
        ..PredictionStatus::default()
    }
}

pub fn succeeded(urls: &[&str]) -> PredictionStatus {
    let output = match urls {
        [single] => json!(single),
        many => json!(many),
    };
    PredictionStatus {
        status: Some(json!("succeeded")),
        output: Some(output),
        error: None,
    }
}

pub fn failed(detail: Option<&str>) -> PredictionStatus {
    PredictionStatus {
        status: Some(json!("failed")),
        output: None,
        error: detail.map(|d| json!(d)),
    }
}

/// Replays `statuses` in order, repeating the last one forever. With no
/// statuses every poll reports pending.
#[derive(Debug)]
pub struct FakeBackend {
    prediction_id: Option<String>,
    statuses: Mutex<VecDeque<PredictionStatus>>,
    downloads: HashMap<String, Bytes>,
    submitted: Mutex<Vec<UpscaleJob>>,
    polls: Mutex<Vec<Instant>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            prediction_id: Some("pred-1".to_string()),
            statuses: Mutex::new(VecDeque::new()),
            downloads: HashMap::new(),
            submitted: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn without_prediction_id(mut self) -> Self {
        self.prediction_id = None;
        self
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = PredictionStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    pub fn with_download(mut self, url: &str, body: &'static [u8]) -> Self {
        self.downloads
            .insert(url.to_string(), Bytes::from_static(body));
        self
    }

    pub fn submitted_jobs(&self) -> Vec<UpscaleJob> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().unwrap().clone()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpscaleBackend for FakeBackend {
    async fn submit(&self, job: &UpscaleJob) -> Result<String, UpstreamError> {
        self.submitted.lock().unwrap().push(job.clone());
        self.prediction_id
            .clone()
            .ok_or(UpstreamError::MissingPredictionId)
    }

    async fn poll(&self, _prediction_id: &str) -> Result<PredictionStatus, UpstreamError> {
        self.polls.lock().unwrap().push(Instant::now());

        let mut statuses = self.statuses.lock().unwrap();
        let next = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(next.unwrap_or_else(pending))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, UpstreamError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.downloads
            .get(url)
            .cloned()
            .ok_or(UpstreamError::Status {
                status: StatusCode::NOT_FOUND,
            })
    }
}
