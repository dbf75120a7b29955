//! Session state machine
//!
//! `Idle -> Preview -> Generating -> Success`, with a failed attempt falling
//! back to `Preview` carrying an error message. Every state change is
//! published as a [`SessionSnapshot`] on a watch channel.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::backend::traits::{GeneratedResult, GenerationClient};
use crate::codec::{self, FileHandle, UploadedImage};
use crate::error::{AppError, Result};

/// Message shown for any failed generation attempt
pub const GENERATION_FAILED_MESSAGE: &str =
    "Something went wrong while generating the anime portrait. Please try again.";

/// Notice shown when a non-image file is selected
pub const INVALID_FILE_NOTICE: &str = "Please upload an image file";

/// Current discrete mode of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    Idle,
    /// Image uploaded; may carry the error of the previous attempt
    Preview,
    Generating,
    Success,
}

/// Internal state; each variant owns exactly the data its phase requires
#[derive(Debug, Clone)]
enum State {
    Idle,
    Preview {
        image: Arc<UploadedImage>,
        error: Option<String>,
    },
    Generating {
        image: Arc<UploadedImage>,
    },
    Success {
        image: Arc<UploadedImage>,
        result: Arc<GeneratedResult>,
    },
}

/// Point-in-time view of the session, published after every change
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub uploaded: Option<Arc<UploadedImage>>,
    pub result: Option<Arc<GeneratedResult>>,
    pub error: Option<String>,
    /// Rejection notice from the last invalid file selection
    pub notice: Option<String>,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            uploaded: None,
            result: None,
            error: None,
            notice: None,
        }
    }
}

/// Owns the session state and mediates all transitions
pub struct SessionController {
    client: Arc<dyn GenerationClient>,
    state: State,
    notice: Option<String>,
    notifier: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        let (notifier, _) = watch::channel(SessionSnapshot::idle());
        Self {
            client,
            state: State::Idle,
            notice: None,
            notifier,
        }
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notifier.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::Idle => SessionPhase::Idle,
            State::Preview { .. } => SessionPhase::Preview,
            State::Generating { .. } => SessionPhase::Generating,
            State::Success { .. } => SessionPhase::Success,
        }
    }

    pub fn uploaded_image(&self) -> Option<&Arc<UploadedImage>> {
        match &self.state {
            State::Idle => None,
            State::Preview { image, .. }
            | State::Generating { image }
            | State::Success { image, .. } => Some(image),
        }
    }

    pub fn generated_result(&self) -> Option<&Arc<GeneratedResult>> {
        match &self.state {
            State::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            State::Preview { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            uploaded: self.uploaded_image().cloned(),
            result: self.generated_result().cloned(),
            error: self.error_message().map(String::from),
            notice: self.notice.clone(),
        }
    }

    fn transition(&mut self, next: State) {
        let from = self.phase();
        self.state = next;
        self.notice = None;
        debug!(from = ?from, to = ?self.phase(), "Session transition");
        self.publish();
    }

    fn publish(&self) {
        self.notifier.send_replace(self.snapshot());
    }

    /// Install a newly selected file
    ///
    /// A non-image file leaves the phase untouched and raises a rejection
    /// notice. A valid image replaces any current image, result and error.
    pub fn select_file(&mut self, file: FileHandle) -> Result<()> {
        if matches!(self.state, State::Generating { .. }) {
            return Err(AppError::PhaseConflict(
                "a portrait is being generated".to_string(),
            ));
        }

        match codec::encode(file) {
            Ok(image) => {
                info!(
                    file_name = ?image.file_name,
                    mime_type = %image.mime_type,
                    size = image.size_bytes(),
                    "Image selected"
                );
                self.transition(State::Preview {
                    image: Arc::new(image),
                    error: None,
                });
                Ok(())
            }
            Err(e) => {
                info!(error = %e, "Rejected file selection");
                self.notice = Some(INVALID_FILE_NOTICE.to_string());
                self.publish();
                Err(e)
            }
        }
    }

    /// Run one generation attempt for the current image
    ///
    /// Only acts from `Preview`; in any other phase this is a no-op and no
    /// request is issued. Failures are recorded on the session, never returned.
    pub async fn generate(&mut self) {
        let image = match &self.state {
            State::Preview { image, .. } => image.clone(),
            _ => {
                debug!(phase = ?self.phase(), "Ignoring generate request");
                return;
            }
        };

        self.transition(State::Generating {
            image: image.clone(),
        });

        match self
            .client
            .generate(&image.base64_payload, &image.mime_type)
            .await
        {
            Ok(result) => {
                info!(client = %self.client.name(), size = result.bytes.len(), "Portrait generated");
                self.transition(State::Success {
                    image,
                    result: Arc::new(result),
                });
            }
            Err(e) => {
                error!(client = %self.client.name(), error = %e, "Portrait generation failed");
                self.transition(State::Preview {
                    image,
                    error: Some(GENERATION_FAILED_MESSAGE.to_string()),
                });
            }
        }
    }

    /// Discard image, result, error and notice
    pub fn reset(&mut self) {
        self.transition(State::Idle);
    }
}
