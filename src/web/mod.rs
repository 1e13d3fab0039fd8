// Web server module
// Serves the upscale endpoint and relays work to the remote backend

mod app;
mod auth;
mod error;
mod extract_request_data;
mod handlers;
mod headers;
mod image_codec;
mod listeners;
mod models;
#[cfg(test)]
mod test_support;

pub use app::create_app;
pub use auth::ApiKeys;
pub use listeners::create_listener;

use crate::fooocus::{PollPolicy, UpscaleBackend};
use std::sync::Arc;

// Default maximum size of the uploaded image file
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

// Headroom for multipart boundaries and the small text fields
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn UpscaleBackend>,
    pub poll_policy: PollPolicy,
    pub max_upload_bytes: usize,
}
