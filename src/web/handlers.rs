// API handlers for the web server

use super::{
    AppState,
    error::ApiError,
    extract_request_data::extract_upscale_form,
    image_codec::{needs_jpeg_transcode, transcode_webp_to_jpeg},
    models::UpscaleParameters,
};
use crate::fooocus::{UpscaleJob, run_prediction};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const RESULT_CACHE_CONTROL: &str = "public, max-age=3600";

// --- POST /tools/upscale ---
// Relays one uploaded image through a remote upscale prediction
pub async fn upscale_image(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();

    let form = extract_upscale_form(request, state.max_upload_bytes).await?;
    let Some(image) = form.image else {
        warn!(%request_id, "Upscale request without 'image' file");
        return Err(ApiError::MissingImage);
    };
    let params = UpscaleParameters::from_form(form.scale.as_deref(), form.face_enhance.as_deref());

    info!(
        %request_id,
        scale = params.scale,
        face_enhance = params.face_enhance,
        media_type = ?image.media_type,
        file_name = ?image.file_name,
        bytes = image.data.len(),
        "Upscale request"
    );

    let image_jpeg = if needs_jpeg_transcode(image.media_type.as_deref()) {
        let data = image.data;
        tokio::task::spawn_blocking(move || transcode_webp_to_jpeg(&data))
            .await?
            .inspect_err(|err| error!(%request_id, "Image transcode failed: {:?}", err))?
    } else {
        image.data
    };

    let job = UpscaleJob {
        image_jpeg,
        scale: params.scale,
        face_enhance: params.face_enhance,
    };

    let result = run_prediction(state.backend.as_ref(), &job, state.poll_policy)
        .await
        .inspect_err(|err| error!(%request_id, "Upscale failed: {}", err))?;

    debug!(%request_id, bytes = result.len(), "Upscale completed");

    jpeg_response(result)
}

fn jpeg_response(body: Bytes) -> Result<Response, ApiError> {
    let disposition = format!(
        "inline; filename=\"upscaled_{}.jpg\"",
        chrono::Utc::now().timestamp_millis()
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (header::CONTENT_LENGTH, HeaderValue::from(body.len())),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(RESULT_CACHE_CONTROL),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
