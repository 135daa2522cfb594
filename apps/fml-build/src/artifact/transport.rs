//! HTTP access for the artifact fetcher.
//!
//! [`Transport`] is the only way the fetcher touches the network, which keeps
//! the cache logic testable against an in-memory double.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::download::download_file;
use crate::errors::FmlError;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("fml-build/", env!("CARGO_PKG_VERSION"));

/// Network operations needed to fetch an artifact.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the status code of a HEAD request for `url`.
    ///
    /// Only connection-level failures are errors; any HTTP status is returned.
    async fn status(&self, url: &str) -> Result<u16>;

    /// Returns the body of `url`, failing on a non-success status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Streams the body of `url` into `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`Transport`] backed by reqwest.
///
/// No request timeout is configured; a stalled server blocks until the
/// connection is dropped.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn status(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| FmlError::download_failure(url, e.to_string()))?;
        let status = response.status().as_u16();
        debug!(%url, status, "HEAD");
        Ok(status)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FmlError::download_failure(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FmlError::download_failure(url, format!("HTTP {status}")).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FmlError::download_failure(url, e.to_string()))?;
        debug!(%url, len = body.len(), "GET");
        Ok(body.to_vec())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        download_file(&self.client, url, dest).await
    }
}
