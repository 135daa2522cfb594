//! Artifact fetch orchestration.
//!
//! Turns a [`VersionSpec`] into the path of a verified, executable binary in
//! the cache, downloading and extracting only what is missing.
//!
//! ## Process
//!
//! 1. Probe the primary checksum URL with HEAD; anything but 200 selects the
//!    fallback endpoint for both files
//! 2. If a checksum is cached, compare it byte for byte with the remote one
//! 3. Wipe the version directory unless the cache is fresh and no refresh was
//!    forced
//! 4. Download the archive if it is missing, verify it, then store its
//!    checksum
//! 5. Extract the binary for the host architecture if it is missing

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::archive::extract_entry;
use super::cache::{ArtifactCache, ArtifactMetadata, CacheEntry, Freshness};
use super::location::{ArtifactLocation, Endpoint, Endpoints};
use super::platform::Architecture;
use super::transport::Transport;
use super::verify::{parse_checksum, verify_checksum};
use super::version::VersionSpec;
use crate::config::FetchConfig;

/// Fetches and caches tool binaries through a [`Transport`].
pub struct ArtifactFetcher<T> {
    transport: T,
    cache: ArtifactCache,
    endpoints: Endpoints,
    tool_name: String,
    force_refresh: bool,
    architecture: Architecture,
}

impl<T: Transport> ArtifactFetcher<T> {
    /// Creates a fetcher for the host architecture.
    #[must_use]
    pub fn new(transport: T, config: FetchConfig) -> Self {
        Self {
            transport,
            cache: ArtifactCache::new(config.cache_root),
            endpoints: config.endpoints,
            tool_name: config.tool_name,
            force_refresh: config.force_refresh,
            architecture: Architecture::detect(),
        }
    }

    /// Overrides the detected architecture.
    #[must_use]
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    #[cfg(test)]
    fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    #[cfg(test)]
    fn transport(&self) -> &T {
        &self.transport
    }

    /// Picks the endpoint serving `version`.
    ///
    /// A HEAD on the primary checksum URL decides; a non-200 status or a
    /// connection error selects the fallback for both files.
    pub async fn select_location(&self, version: &VersionSpec) -> ArtifactLocation {
        let primary = self
            .endpoints
            .locate(Endpoint::Primary, version, &self.tool_name);

        match self.transport.status(&primary.checksum_url).await {
            Ok(200) => {
                debug!(url = %primary.checksum_url, "Primary endpoint available");
                return primary;
            }
            Ok(status) => {
                warn!(url = %primary.checksum_url, status, "Primary endpoint unavailable, using fallback");
            }
            Err(e) => {
                warn!(url = %primary.checksum_url, error = %e, "Primary endpoint unreachable, using fallback");
            }
        }

        self.endpoints
            .locate(Endpoint::Fallback, version, &self.tool_name)
    }

    /// Returns the absolute path of a verified binary for `version`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A download fails ([`FmlError::DownloadFailure`])
    /// - The archive does not match its checksum ([`FmlError::ChecksumMismatch`])
    /// - The host architecture has no binary ([`FmlError::UnsupportedArchitecture`])
    /// - The archive lacks the expected entry ([`FmlError::BinaryNotInArchive`])
    /// - A cache file cannot be read or written
    ///
    /// [`FmlError::DownloadFailure`]: crate::errors::FmlError::DownloadFailure
    /// [`FmlError::ChecksumMismatch`]: crate::errors::FmlError::ChecksumMismatch
    /// [`FmlError::UnsupportedArchitecture`]: crate::errors::FmlError::UnsupportedArchitecture
    /// [`FmlError::BinaryNotInArchive`]: crate::errors::FmlError::BinaryNotInArchive
    pub async fn fetch(&self, version: &VersionSpec) -> Result<PathBuf> {
        let location = self.select_location(version).await;
        let entry = self.cache.entry(version, &self.tool_name);

        let stored = entry.stored_checksum()?;
        let remote = match stored {
            Some(_) => Some(self.transport.fetch(&location.checksum_url).await?),
            None => None,
        };
        let freshness = match &remote {
            Some(remote) => Freshness::compare(stored.as_deref(), remote),
            None => Freshness::Absent,
        };
        debug!(%version, ?freshness, "Checked cache");

        if freshness == Freshness::Fresh && !self.force_refresh {
            if let Ok(Some(metadata)) = entry.read_metadata() {
                debug!(
                    endpoint = %metadata.endpoint,
                    fetched_at = metadata.fetched_at,
                    "Cached archive is current"
                );
            }
        } else {
            if self.force_refresh {
                info!(%version, "Forced refresh");
            } else if freshness == Freshness::Stale {
                info!(%version, "Remote checksum changed, refreshing cache");
            }
            entry.invalidate()?;
        }

        entry.ensure_dirs()?;

        if !entry.has_archive() {
            self.download_verified(version, &location, &entry, remote)
                .await?;
        }

        if !entry.has_executable() {
            let archive_entry = self.architecture.archive_entry(&self.tool_name)?;
            debug!(entry = %archive_entry, arch = %self.architecture, "Extracting");
            extract_entry(&entry.archive, &archive_entry, &entry.executable)?;
        }

        std::path::absolute(&entry.executable)
            .with_context(|| format!("Failed to resolve {}", entry.executable.display()))
    }

    async fn download_verified(
        &self,
        version: &VersionSpec,
        location: &ArtifactLocation,
        entry: &CacheEntry,
        remote_checksum: Option<Vec<u8>>,
    ) -> Result<()> {
        let checksum = match remote_checksum {
            Some(bytes) => bytes,
            None => self.transport.fetch(&location.checksum_url).await?,
        };

        info!(%version, endpoint = %location.endpoint, "Downloading {}", self.tool_name);
        self.transport
            .download(&location.archive_url, &entry.archive)
            .await?;

        // The checksum file is only written for a verified archive, so an
        // interrupted run leaves the entry without one and it is refetched.
        let expected = String::from_utf8_lossy(&checksum);
        if let Err(e) = verify_checksum(&entry.archive, parse_checksum(&expected)) {
            entry.invalidate()?;
            return Err(e);
        }
        std::fs::write(&entry.checksum, &checksum)
            .with_context(|| format!("Failed to write {}", entry.checksum.display()))?;
        debug!(archive = %entry.archive.display(), "Checksum verified");

        let metadata = ArtifactMetadata::now(version, location.endpoint, &location.archive_url);
        entry.write_metadata(&metadata)
    }
}
