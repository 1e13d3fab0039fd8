// Request-side models for the upscale endpoint.

use std::ops::RangeInclusive;

pub const DEFAULT_SCALE: u32 = 4;
pub const SCALE_RANGE: RangeInclusive<u32> = 2..=10;

/// Effective parameters of one upscale. Malformed input never fails the
/// request; it falls back to the defaults instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpscaleParameters {
    pub scale: u32,
    pub face_enhance: bool,
}

impl Default for UpscaleParameters {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            face_enhance: true,
        }
    }
}

impl UpscaleParameters {
    pub fn from_form(scale: Option<&str>, face_enhance: Option<&str>) -> Self {
        Self {
            scale: coerce_scale(scale),
            face_enhance: face_enhance != Some("false"),
        }
    }
}

fn coerce_scale(raw: Option<&str>) -> u32 {
    raw.and_then(leading_integer)
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| SCALE_RANGE.contains(value))
        .unwrap_or(DEFAULT_SCALE)
}

// Reads an optionally signed run of digits after leading whitespace and
// ignores whatever follows, so "3x" reads as 3 and "4.5" as 4.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits_len == 0 {
        return None;
    }

    trimmed[..sign_len + digits_len].parse().ok()
}
