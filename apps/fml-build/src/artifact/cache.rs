//! On-disk artifact cache.
//!
//! ## Directory Structure
//!
//! ```text
//! <cache root>/                 # --cache-dir (or FML_CACHE_DIR)
//!   120.1/                      # one directory per normalized version
//!     .metadata.json            # where and when the archive was fetched
//!     bin/
//!       fml.zip                 # downloaded archive
//!       fml.sha256              # checksum file the archive was verified against
//!       fml                     # binary extracted for the host architecture
//!   repo-cache/                 # passed to the tool as its own --cache-dir
//! ```
//!
//! A version directory is all-or-nothing: when it is stale it is removed as a
//! whole before anything is downloaded again.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::location::{Endpoint, archive_file_name, checksum_file_name};
use super::version::VersionSpec;

/// Metadata file name stored in each version directory.
const METADATA_FILE: &str = ".metadata.json";

/// Directory handed to the tool for its own downloads.
const REPO_CACHE_DIR: &str = "repo-cache";

/// Root of the artifact cache.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    /// Creates a cache rooted at `root`. Nothing is created on disk.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the default cache root, `<user cache dir>/fml-build`.
    #[must_use]
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("fml-build")
    }

    /// Returns the directory the tool uses for its own cache.
    #[must_use]
    pub fn repo_cache_dir(&self) -> PathBuf {
        self.root.join(REPO_CACHE_DIR)
    }

    /// Returns the entry for one version of a tool.
    #[must_use]
    pub fn entry(&self, version: &VersionSpec, name: &str) -> CacheEntry {
        let version_dir = self.root.join(version.as_str());
        let bin_dir = version_dir.join("bin");
        CacheEntry {
            archive: bin_dir.join(archive_file_name(name)),
            checksum: bin_dir.join(checksum_file_name(name)),
            executable: bin_dir.join(name),
            bin_dir,
            version_dir,
        }
    }
}

/// Result of comparing a cached checksum against the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No checksum is stored; whatever else is in the directory is untrusted.
    Absent,
    /// The stored checksum equals the remote checksum byte for byte.
    Fresh,
    /// The stored checksum differs from the remote checksum.
    Stale,
}

impl Freshness {
    /// Compares stored and remote checksum file contents.
    #[must_use]
    pub fn compare(stored: Option<&[u8]>, remote: &[u8]) -> Self {
        match stored {
            None => Self::Absent,
            Some(stored) if stored == remote => Self::Fresh,
            Some(_) => Self::Stale,
        }
    }
}

/// Paths of one cached version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// `<root>/<version>`
    pub version_dir: PathBuf,
    /// `<root>/<version>/bin`
    pub bin_dir: PathBuf,
    /// Downloaded archive.
    pub archive: PathBuf,
    /// Checksum file the archive was verified against.
    pub checksum: PathBuf,
    /// Extracted binary.
    pub executable: PathBuf,
}

impl CacheEntry {
    /// Reads the stored checksum file, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn stored_checksum(&self) -> Result<Option<Vec<u8>>> {
        if !self.checksum.is_file() {
            return Ok(None);
        }
        std::fs::read(&self.checksum)
            .map(Some)
            .with_context(|| format!("Failed to read {}", self.checksum.display()))
    }

    /// Removes the whole version directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists and cannot be removed.
    pub fn invalidate(&self) -> Result<()> {
        if self.version_dir.exists() {
            debug!(dir = %self.version_dir.display(), "Removing cached version");
            std::fs::remove_dir_all(&self.version_dir).with_context(|| {
                format!("Failed to remove {}", self.version_dir.display())
            })?;
        }
        Ok(())
    }

    /// Creates the `bin` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.bin_dir)
            .with_context(|| format!("Failed to create directory: {}", self.bin_dir.display()))
    }

    /// Returns whether the archive has been downloaded.
    #[must_use]
    pub fn has_archive(&self) -> bool {
        self.archive.is_file()
    }

    /// Returns whether the binary has been extracted.
    #[must_use]
    pub fn has_executable(&self) -> bool {
        self.executable.is_file()
    }

    /// Writes fetch metadata next to `bin/`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_metadata(&self, metadata: &ArtifactMetadata) -> Result<()> {
        let path = self.version_dir.join(METADATA_FILE);
        let json =
            serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write metadata: {}", path.display()))
    }

    /// Reads fetch metadata, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed.
    pub fn read_metadata(&self) -> Result<Option<ArtifactMetadata>> {
        let path = self.version_dir.join(METADATA_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        let metadata = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse metadata: {}", path.display()))?;
        Ok(Some(metadata))
    }
}

/// Where and when a cached archive came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Normalized version.
    pub version: String,
    /// Endpoint the archive was downloaded from.
    pub endpoint: Endpoint,
    /// Archive URL.
    pub archive_url: String,
    /// Unix timestamp (seconds) of the download.
    pub fetched_at: u64,
}

impl ArtifactMetadata {
    /// Creates metadata stamped with the current time.
    #[must_use]
    pub fn now(version: &VersionSpec, endpoint: Endpoint, archive_url: &str) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let fetched_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());

        Self {
            version: version.to_string(),
            endpoint,
            archive_url: archive_url.to_string(),
            fetched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn version(v: &str) -> VersionSpec {
        VersionSpec::parse(v).unwrap()
    }

    #[test]
    fn entry_paths_follow_layout() {
        let cache = ArtifactCache::new(PathBuf::from("/tmp/cache"));
        let entry = cache.entry(&version("120.0.1"), "fml");

        assert_eq!(entry.version_dir, PathBuf::from("/tmp/cache/120.1"));
        assert_eq!(entry.archive, PathBuf::from("/tmp/cache/120.1/bin/fml.zip"));
        assert_eq!(entry.checksum, PathBuf::from("/tmp/cache/120.1/bin/fml.sha256"));
        assert_eq!(entry.executable, PathBuf::from("/tmp/cache/120.1/bin/fml"));
        assert_eq!(cache.repo_cache_dir(), PathBuf::from("/tmp/cache/repo-cache"));
    }

    #[test]
    fn freshness_compare() {
        assert_eq!(Freshness::compare(None, b"abc"), Freshness::Absent);
        assert_eq!(Freshness::compare(Some(b"abc"), b"abc"), Freshness::Fresh);
        assert_eq!(Freshness::compare(Some(b"abc\n"), b"abc"), Freshness::Stale);
    }

    #[test]
    fn stored_checksum_absent_without_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let cache = ArtifactCache::new(temp.path().to_path_buf());
        let entry = cache.entry(&version("120.1"), "fml");

        assert!(entry.stored_checksum().unwrap().is_none());

        entry.ensure_dirs().unwrap();
        std::fs::write(&entry.checksum, b"abc  fml.zip\n").unwrap();
        assert_eq!(
            entry.stored_checksum().unwrap().as_deref(),
            Some(&b"abc  fml.zip\n"[..])
        );
    }

    #[test]
    fn invalidate_removes_whole_version_dir() {
        let temp = assert_fs::TempDir::new().unwrap();
        let cache = ArtifactCache::new(temp.path().to_path_buf());
        let entry = cache.entry(&version("120.1"), "fml");
        entry.ensure_dirs().unwrap();
        std::fs::write(&entry.executable, b"bin").unwrap();
        temp.child("120.1").child("stray").write_str("x").unwrap();
        temp.child("121.0").create_dir_all().unwrap();

        entry.invalidate().unwrap();

        temp.child("120.1").assert(predicates::path::missing());
        temp.child("121.0").assert(predicates::path::is_dir());
    }

    #[test]
    fn invalidate_missing_dir_is_ok() {
        let temp = assert_fs::TempDir::new().unwrap();
        let cache = ArtifactCache::new(temp.path().to_path_buf());
        cache.entry(&version("120.1"), "fml").invalidate().unwrap();
    }

    #[test]
    fn metadata_round_trips() {
        let temp = assert_fs::TempDir::new().unwrap();
        let cache = ArtifactCache::new(temp.path().to_path_buf());
        let entry = cache.entry(&version("120.1"), "fml");
        entry.ensure_dirs().unwrap();

        assert!(entry.read_metadata().unwrap().is_none());

        let metadata = ArtifactMetadata::now(
            &version("120.1"),
            Endpoint::Fallback,
            "https://ci.example/fml.zip",
        );
        entry.write_metadata(&metadata).unwrap();

        let read = entry.read_metadata().unwrap().unwrap();
        assert_eq!(read, metadata);
        assert!(read.fetched_at > 0);

        let raw = std::fs::read_to_string(temp.path().join("120.1/.metadata.json")).unwrap();
        assert!(raw.contains("\"endpoint\": \"fallback\""));
    }

    #[test]
    fn default_root_ends_with_crate_name() {
        assert!(ArtifactCache::default_root().ends_with("fml-build"));
    }
}
