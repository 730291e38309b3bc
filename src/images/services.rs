use base64ct::{Base64, Encoding};

use crate::{completion::ImagePayload, error::ApiError};

/// Uploads without a content type are treated as JPEG.
const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Encodes an uploaded image for the completion service.
pub fn image_payload(body: &[u8], content_type: Option<&str>) -> Result<ImagePayload, ApiError> {
    if body.is_empty() {
        return Err(ApiError::invalid("Image file is empty"));
    }
    let media_type = match content_type {
        None => DEFAULT_MEDIA_TYPE,
        Some(ct) => normalize_media_type(ct)
            .ok_or_else(|| ApiError::invalid(format!("Unsupported image type: {ct}")))?,
    };
    Ok(ImagePayload {
        media_type: media_type.to_string(),
        data: Base64::encode_string(body),
    })
}

fn normalize_media_type(ct: &str) -> Option<&'static str> {
    let essence = ct.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        "image/gif" => Some("image/gif"),
        _ => None,
    }
}
