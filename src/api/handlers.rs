//! HTTP handlers rendering the session for a browser view

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::codec::FileHandle;
use crate::download::download_filename;
use crate::error::{AppError, Result};
use crate::session::{SessionPhase, SessionSnapshot};
use crate::AppState;

/// Header carrying the original file name of an upload
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// JSON rendering of a [`SessionSnapshot`]
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub uploaded: Option<UploadedView>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadedView {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub size_bytes: usize,
    pub preview_url: String,
}

#[derive(Debug, Serialize)]
pub struct ResultView {
    pub image_url: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SessionSnapshot> for SessionView {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            uploaded: snapshot.uploaded.as_ref().map(|image| UploadedView {
                file_name: image.file_name.clone(),
                mime_type: image.mime_type.clone(),
                size_bytes: image.size_bytes(),
                preview_url: image.preview_reference.clone(),
            }),
            result: snapshot.result.as_ref().map(|result| ResultView {
                image_url: result.image_reference.clone(),
                mime_type: result.mime_type.clone(),
                created_at: result.created_at,
            }),
            error: snapshot.error.clone(),
            notice: snapshot.notice.clone(),
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

/// `GET /api/session`
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(SessionView::from(&state.session.snapshot()))
}

/// `POST /api/session/upload`, body is the raw file
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SessionView>> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let file = FileHandle::new(name, media_type, body.to_vec());
    let snapshot = state.session.upload(file).await?;
    Ok(Json(SessionView::from(&snapshot)))
}

/// `POST /api/session/generate`, resolves once the attempt settles
pub async fn generate(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>> {
    let snapshot = state.session.generate().await?;
    Ok(Json(SessionView::from(&snapshot)))
}

/// `POST /api/session/reset`
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>> {
    let snapshot = state.session.reset().await?;
    Ok(Json(SessionView::from(&snapshot)))
}

/// `GET /api/session/download`
pub async fn download(State(state): State<Arc<AppState>>) -> Result<Response> {
    let result = state.session.snapshot().result.ok_or(AppError::NoResult)?;
    let filename = download_filename(Utc::now());

    info!(filename = %filename, size = result.bytes.len(), "Serving portrait download");

    Ok((
        [
            (header::CONTENT_TYPE, result.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        result.bytes.clone(),
    )
        .into_response())
}
