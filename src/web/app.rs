use super::{AppState, FORM_OVERHEAD_BYTES, auth, auth::ApiKeys, handlers};
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::post};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

pub fn create_app(state: AppState, api_keys: ApiKeys) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    let mut tools: Router<AppState> = Router::new().route("/tools/upscale", post(handlers::upscale_image));

    // Only gate the tool routes when keys are configured
    if !api_keys.is_empty() {
        tools = tools.route_layer(middleware::from_fn_with_state(
            api_keys,
            auth::require_api_key,
        ));
    }

    tools
        // Apply a layer to limit the maximum size of request bodies
        .layer(DefaultBodyLimit::max(body_limit))
        // Add CORS layer for broader client compatibility
        .layer(CorsLayer::permissive())
        // Add tracing for HTTP requests and responses
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        // Provide the shared state
        .with_state(state)
}
