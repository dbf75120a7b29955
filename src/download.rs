//! Saving generated portraits as local files

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::backend::traits::GeneratedResult;
use crate::error::Result;

/// Download name for a portrait saved at `at`
pub fn download_filename(at: DateTime<Utc>) -> String {
    format!("anime-portrait-{}.png", at.timestamp_millis())
}

/// Writes generated results into an output directory
pub struct DownloadHandler {
    output_dir: PathBuf,
}

impl DownloadHandler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure the output directory exists
    pub async fn ensure_output_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
            debug!(path = ?self.output_dir, "Created output directory");
        }
        Ok(())
    }

    /// Save a result under a timestamped name and return its path
    pub async fn save(&self, result: &GeneratedResult) -> Result<PathBuf> {
        self.ensure_output_dir().await?;

        let file_path = self.output_dir.join(download_filename(Utc::now()));
        fs::write(&file_path, &result.bytes).await?;

        debug!(path = ?file_path, size = result.bytes.len(), "Saved portrait");

        Ok(file_path)
    }
}
