// API-key gate in front of the tool routes.

use super::{error::ApiError, headers::ApiKey};
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use headers::HeaderMapExt;
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// Keys accepted by the gate. Blank entries are discarded.
#[derive(Clone, Default)]
pub struct ApiKeys(Arc<[String]>);

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKeys").field(&self.0.len()).finish()
    }
}

impl ApiKeys {
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
        Self(keys.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    // Checks every configured key so timing does not reveal which one matched.
    fn accepts(&self, candidate: &str) -> bool {
        self.0
            .iter()
            .fold(false, |found, key| found | secure_compare(key, candidate))
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    apikey: Option<String>,
}

/// Accepts the key from `X-API-Key` or, failing that, from `?apikey=`.
pub async fn require_api_key(
    State(keys): State<ApiKeys>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let candidate = match request.headers().typed_get::<ApiKey>() {
        Some(ApiKey(key)) => Some(key),
        None => Query::<ApiKeyQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.apikey)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty()),
    };

    let Some(candidate) = candidate else {
        debug!("Rejected request without API key");
        return Err(ApiError::Unauthorized(
            "An API key is required (X-API-Key header or 'apikey' query parameter).".into(),
        ));
    };

    if !keys.accepts(&candidate) {
        warn!("Rejected request with invalid API key");
        return Err(ApiError::Unauthorized("Invalid API key.".into()));
    }

    Ok(next.run(request).await)
}
