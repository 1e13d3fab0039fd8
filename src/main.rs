// Main entry point for the upscale-relay application.
// Parses configuration, builds the fooocus.one client, configures the Axum
// router, and serves it until a shutdown signal arrives.

mod fooocus;
mod shutdown_signal;
mod web;

use clap::Parser;
use fooocus::{
    DEFAULT_BASE_URL, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_MODEL_VERSION, DEFAULT_USER_AGENT,
    FooocusClient, FooocusClientConfig, PollPolicy,
};
use shutdown_signal::shutdown_signal;
use std::{sync::Arc, time::Duration};
use tracing::Level;
use web::{ApiKeys, AppState, DEFAULT_MAX_UPLOAD_BYTES};

/// Command line arguments for upscale-relay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct AppConfig {
    /// Hostname/IP to bind the server to.
    /// If this option is specified without value, it will default to "*", meaning the server will listen on all interfaces.
    #[arg(long, env = "UPSCALE_RELAY_HOST", default_value = "localhost", num_args = 0..=1, default_missing_value = "*")]
    host: String,

    /// Port number to listen on.
    #[arg(short, long, env = "UPSCALE_RELAY_PORT", default_value_t = 6796)]
    port: u16,

    /// API keys accepted on /tools routes (repeat the flag or separate with commas).
    /// When none are given, the routes are open.
    #[arg(long = "api-key", env = "UPSCALE_RELAY_API_KEYS", value_delimiter = ',')]
    api_keys: Vec<String>,

    /// Base URL of the prediction API.
    #[arg(long, env = "UPSCALE_RELAY_UPSTREAM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    upstream_base_url: String,

    /// Model version submitted with every prediction.
    #[arg(long, env = "UPSCALE_RELAY_MODEL_VERSION", default_value = DEFAULT_MODEL_VERSION)]
    model_version: String,

    /// User-Agent sent on every outbound request.
    #[arg(long, env = "UPSCALE_RELAY_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Seconds to wait between prediction status polls.
    #[arg(long, env = "UPSCALE_RELAY_POLL_INTERVAL_SECS", default_value_t = 3)]
    poll_interval_secs: u64,

    /// Maximum number of status polls before giving up.
    #[arg(long, env = "UPSCALE_RELAY_MAX_POLL_ATTEMPTS", default_value_t = DEFAULT_MAX_POLL_ATTEMPTS,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_poll_attempts: u32,

    /// Timeout in seconds for each submit and poll request.
    #[arg(long, env = "UPSCALE_RELAY_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    request_timeout_secs: u64,

    /// Timeout in seconds for downloading the finished image.
    #[arg(long, env = "UPSCALE_RELAY_DOWNLOAD_TIMEOUT_SECS", default_value_t = 60)]
    download_timeout_secs: u64,

    /// Maximum size of the uploaded image in bytes.
    #[arg(long, env = "UPSCALE_RELAY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    /// Maximum log level (error, warn, info, debug, trace).
    #[arg(long, env = "UPSCALE_RELAY_LOG_LEVEL", default_value = "info")]
    log_level: Level,
}

impl AppConfig {
    fn client_config(&self) -> FooocusClientConfig {
        FooocusClientConfig {
            base_url: self.upstream_base_url.clone(),
            model_version: self.model_version.clone(),
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            download_timeout: Duration::from_secs(self.download_timeout_secs),
        }
    }

    fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.max_poll_attempts,
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Parse command line args and environment variables
    let config = AppConfig::parse();

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true) // Include module path in logs
        .with_file(true) // Include source file name
        .with_line_number(true) // Include line numbers
        .init();

    tracing::info!("Starting upscale-relay...");

    let client = FooocusClient::new(config.client_config()).unwrap_or_else(|err| {
        tracing::error!("FATAL: Failed to build HTTP client: {}", err);
        eprintln!("FATAL: Could not build HTTP client. Error: {}. Exiting.", err);
        std::process::exit(1);
    });
    tracing::info!("Upstream: {:?}", client);

    let poll_policy = config.poll_policy();
    tracing::info!(
        "Polling up to {} times, {:?} apart",
        poll_policy.max_attempts,
        poll_policy.interval
    );

    let api_keys = ApiKeys::new(config.api_keys.iter().cloned());
    if api_keys.is_empty() {
        tracing::warn!("No API keys configured - /tools routes accept any request");
    } else {
        tracing::info!("API key validation enabled with {} key(s)", api_keys.len());
    }

    let state = AppState {
        backend: Arc::new(client),
        poll_policy,
        max_upload_bytes: config.max_upload_bytes,
    };
    let app = web::create_app(state, api_keys);

    tracing::info!("Axum router configured.");

    // --- Start HTTP Server ---
    let listener = match web::create_listener(&config.host, config.port).await {
        Ok((addr, l)) => {
            tracing::info!("Server successfully bound. Listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("FATAL: Failed to bind server: {}", e);
            eprintln!("FATAL: Could not bind server. Error: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    // Run the server.
    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server run error: {}", e);
        eprintln!("ERROR: Server shut down unexpectedly. Error: {}", e);
    }

    tracing::info!("upscale-relay has shut down.");
}
