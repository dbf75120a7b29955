//! Anime Portrait
//!
//! Uploads a photo, hands it to a hosted image model with a fixed anime-style
//! instruction, and exposes the result for display and download. The session
//! state machine lives in [`session`]; [`api`] renders it over HTTP.

pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod download;
pub mod error;
pub mod session;

pub use error::{AppError, GenerationFailure, Result};

use std::sync::Arc;

use session::SessionHandle;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub session: SessionHandle,
}
