use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use bytes::Bytes;
use tracing::{debug, warn};

use super::error::ApiError;

const IMAGE_FIELD: &str = "image";
const SCALE_FIELD: &str = "scale";
const FACE_ENHANCE_FIELD: &str = "face_enhance";

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    pub media_type: Option<String>,
    pub file_name: Option<String>,
}

/// Raw fields of an upscale form. Parameters stay as sent; coercion happens
/// in `UpscaleParameters::from_form`.
#[derive(Debug, Default)]
pub struct UpscaleForm {
    pub image: Option<UploadedImage>,
    pub scale: Option<String>,
    pub face_enhance: Option<String>,
}

pub async fn extract_upscale_form(
    request: Request,
    max_upload_bytes: usize,
) -> Result<UpscaleForm, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    // Anything else simply carries no file.
    if !is_multipart {
        debug!("Request is not multipart/form-data, no image field present");
        return Ok(UpscaleForm::default());
    }

    let multipart = Multipart::from_request(request, &()).await?;
    read_multipart_fields(multipart, max_upload_bytes).await
}

async fn read_multipart_fields(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<UpscaleForm, ApiError> {
    let mut form = UpscaleForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);

        match field_name.as_deref() {
            Some(IMAGE_FIELD) => {
                let media_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;

                if data.len() > max_upload_bytes {
                    return Err(ApiError::PayloadTooLarge {
                        limit: max_upload_bytes,
                    });
                }

                if form.image.is_some() {
                    warn!("Multiple 'image' fields found in multipart request, using the last one");
                }

                debug!(
                    "Received image: {} bytes, content type {:?}, file name {:?}",
                    data.len(),
                    media_type,
                    file_name
                );
                form.image = Some(UploadedImage {
                    data,
                    media_type,
                    file_name,
                });
            }
            Some(SCALE_FIELD) => form.scale = Some(field.text().await?),
            Some(FACE_ENHANCE_FIELD) => form.face_enhance = Some(field.text().await?),
            other => {
                debug!("Ignoring multipart field: {}", other.unwrap_or("unnamed"));
            }
        }
    }

    Ok(form)
}
