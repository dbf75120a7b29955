//! Image codec - turns a user-supplied file into an uploadable image
//!
//! Every entry point (HTTP upload, files opened from disk) funnels through
//! [`encode`], so validation happens in exactly one place.

pub mod base64;

use std::path::Path;
use tracing::debug;

use crate::error::{AppError, Result};

/// A user-supplied file as received from a picker, a drop or the filesystem
#[derive(Debug, Clone)]
pub struct FileHandle {
    /// Original file name, if the source provided one
    pub name: Option<String>,
    /// Declared media kind, e.g. `image/jpeg`
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: Option<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name,
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its media kind from the extension
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());

        debug!(path = ?path, media_type = %media_type, size = bytes.len(), "Opened file");

        Ok(Self::new(name, media_type, bytes))
    }

    /// Declared media kind without parameters, lowercased
    pub fn essence(&self) -> String {
        self.media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// Whether the declared media kind is an image
    pub fn is_image(&self) -> bool {
        self.essence().starts_with("image/")
    }
}

/// An encoded upload, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub raw_bytes: Vec<u8>,
    /// Displayable reference: the payload with its data URI header intact
    pub preview_reference: String,
    /// Transportable payload with no header
    pub base64_payload: String,
    pub mime_type: String,
}

impl UploadedImage {
    pub fn size_bytes(&self) -> usize {
        self.raw_bytes.len()
    }
}

/// Encode a file into an [`UploadedImage`]
///
/// Fails with [`AppError::InvalidInputKind`] when the declared media kind is
/// not an image. Touches no session state.
pub fn encode(file: FileHandle) -> Result<UploadedImage> {
    if !file.is_image() {
        return Err(AppError::InvalidInputKind(file.media_type));
    }

    let mime_type = file.essence();
    let base64_payload = base64::encode(&file.bytes);
    let preview_reference = base64::data_uri(&mime_type, &base64_payload);

    debug!(
        file_name = ?file.name,
        mime_type = %mime_type,
        size = file.bytes.len(),
        "Encoded upload"
    );

    Ok(UploadedImage {
        file_name: file.name,
        raw_bytes: file.bytes,
        preview_reference,
        base64_payload,
        mime_type,
    })
}
