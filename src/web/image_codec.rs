use bytes::Bytes;
use image::{ExtendedColorType, ImageFormat, codecs::jpeg::JpegEncoder};
use std::io::Cursor;
use tracing::debug;

use super::error::ApiError;

/// Quality of the JPEG produced when an upload has to be re-encoded.
pub const JPEG_QUALITY: u8 = 80;

/// Whether an upload of this media type must be re-encoded before the remote
/// accepts it. Only WebP is; everything else is forwarded as sent.
pub fn needs_jpeg_transcode(media_type: Option<&str>) -> bool {
    media_type
        .and_then(|s| s.parse::<mime::Mime>().ok())
        .is_some_and(|parsed| {
            parsed.type_() == mime::IMAGE && parsed.subtype().as_str().eq_ignore_ascii_case("webp")
        })
}

/// Decodes a WebP upload and re-encodes it as baseline JPEG. Alpha is
/// dropped. Blocking; run it off the async executor.
pub fn transcode_webp_to_jpeg(data: &[u8]) -> Result<Bytes, ApiError> {
    let dyn_img = image::load_from_memory_with_format(data, ImageFormat::WebP)?;
    let rgb = dyn_img.to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;

    let jpeg = buffer.into_inner();
    debug!(
        "Transcoded WebP {}x{} ({} bytes) to JPEG ({} bytes)",
        rgb.width(),
        rgb.height(),
        data.len(),
        jpeg.len()
    );

    Ok(Bytes::from(jpeg))
}
