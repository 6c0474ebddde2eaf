//! Image upload constraints.
//!
//! Checked client-side before any network call; the upload endpoint
//! enforces the same limits again.

use std::path::Path;

use crate::error::CoreError;

/// Accepted MIME types for preview images.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Maximum upload size (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub const MSG_INVALID_IMAGE_TYPE: &str =
    "Please select a valid image file (JPEG, PNG, WebP, or GIF)";
pub const MSG_IMAGE_TOO_LARGE: &str = "Image size must be less than 5MB";

/// An image selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reject files with a disallowed type or over the size limit.
pub fn validate_image(content_type: &str, size: u64) -> Result<(), CoreError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.to_ascii_lowercase().as_str()) {
        return Err(CoreError::UploadRejected(MSG_INVALID_IMAGE_TYPE.into()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(CoreError::UploadRejected(MSG_IMAGE_TOO_LARGE.into()));
    }
    Ok(())
}

/// Infer an image MIME type from a file extension.
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
