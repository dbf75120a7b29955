//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::traits::{GeneratedResult, GenerationClient, ANIME_PORTRAIT_INSTRUCTION};
use crate::config::GeminiConfig;
use crate::error::{AppError, GenerationFailure, Result};

/// HTTP client for the Gemini image model
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: RequestInlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    inline_data: Option<ResponseInlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseInlineData {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// First segment carrying inline image data, across all candidates in order
    fn first_inline_image(&self) -> Option<&ResponseInlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.data.as_deref().is_some_and(|data| !data.is_empty()))
    }
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        base64_payload: &str,
        mime_type: &str,
    ) -> std::result::Result<GeneratedResult, GenerationFailure> {
        let url = self.endpoint();

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Inline {
                        inline_data: RequestInlineData {
                            mime_type,
                            data: base64_payload,
                        },
                    },
                    RequestPart::Text {
                        text: ANIME_PORTRAIT_INSTRUCTION,
                    },
                ],
            }],
        };

        debug!(model = %self.model, mime_type = %mime_type, "Sending generate request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    "timed out"
                } else if e.is_connect() {
                    "could not connect"
                } else {
                    "failed"
                };
                GenerationFailure::Transport(format!("Request to {} {}: {}", self.model, kind, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationFailure::Transport(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationFailure::Transport(format!("Failed to parse response: {}", e)))?;

        match body.first_inline_image() {
            Some(inline) => {
                let data = inline.data.as_deref().unwrap_or_default();
                let result = GeneratedResult::from_inline(inline.mime_type.as_deref(), data)?;
                debug!(model = %self.model, size = result.bytes.len(), "Received generated image");
                Ok(result)
            }
            None => {
                let text: Vec<&str> = body.parts().filter_map(|p| p.text.as_deref()).collect();
                warn!(
                    model = %self.model,
                    candidates = body.candidates.len(),
                    text = ?text,
                    "Response carried no inline image"
                );
                Err(GenerationFailure::NoImageReturned)
            }
        }
    }
}
