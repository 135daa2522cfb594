//! Streaming HTTP downloads.
//!
//! The body is written to `<dest>.tmp` and renamed into place once complete,
//! so a failed transfer never leaves a truncated file under the final name.
//! There is no retry: a failed download aborts the run.

use std::path::Path;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::errors::FmlError;

/// Downloads `url` to `dest` with the given client.
///
/// # Errors
///
/// Returns [`FmlError::DownloadFailure`] on connection errors, non-success
/// status codes, or a broken body stream, and an I/O error if the file
/// cannot be written.
pub async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let temp_path = dest.with_extension("tmp");

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    match stream_to_file(client, url, &temp_path).await {
        Ok(bytes) => {
            tokio::fs::rename(&temp_path, dest).await.with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    dest.display()
                )
            })?;
            info!(%url, size = %format_bytes(bytes), "Downloaded");
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(e)
        }
    }
}

async fn stream_to_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    debug!(%url, dest = %dest.display(), "Starting download");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FmlError::download_failure(url, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FmlError::download_failure(url, format!("HTTP {status}")).into());
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FmlError::download_failure(url, e.to_string()))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write to {}", dest.display()))?;
        downloaded += chunk.len() as u64;
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", dest.display()))?;

    Ok(downloaded)
}

/// Formats bytes into a human-readable string (KB, MB, GB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
