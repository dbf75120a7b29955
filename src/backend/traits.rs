//! Common traits and types for image generation clients

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::codec::base64;
use crate::error::GenerationFailure;

/// Fixed instruction sent alongside every uploaded photo
pub const ANIME_PORTRAIT_INSTRUCTION: &str = "Transform this photo into a high-quality anime style sketch portrait. \
Maintain the facial features, expression, and angle of the person, but render them in a clean, detailed \
Japanese anime art style. Use vibrant colors, cell shading, and expressive eyes typical of modern anime. \
The background should be simple or abstract to keep focus on the character.";

/// Media type assumed when the endpoint does not declare one
pub const DEFAULT_RESULT_MIME_TYPE: &str = "image/png";

/// A successfully generated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResult {
    /// Displayable data URI
    pub image_reference: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedResult {
    /// Build a result from an inline base64 segment
    pub fn from_inline(mime_type: Option<&str>, data: &str) -> Result<Self, GenerationFailure> {
        let mime_type = mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_RESULT_MIME_TYPE)
            .to_string();
        let payload = base64::strip_data_uri_prefix(data).trim();
        let bytes = base64::decode(payload)
            .map_err(|e| GenerationFailure::Transport(format!("Invalid inline image data: {}", e)))?;

        Ok(Self {
            image_reference: base64::data_uri(&mime_type, payload),
            mime_type,
            bytes,
            created_at: Utc::now(),
        })
    }
}

/// Trait for remote image generation endpoints
///
/// One call is one attempt: implementations never retry.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Client name used in logs
    fn name(&self) -> &str;

    /// Turn a base64 image payload into a generated result
    async fn generate(
        &self,
        base64_payload: &str,
        mime_type: &str,
    ) -> Result<GeneratedResult, GenerationFailure>;
}
