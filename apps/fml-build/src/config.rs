//! Explicit run configuration.
//!
//! The CLI layer fills these structs from flags and environment defaults;
//! nothing below it reads the process environment.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::artifact::{Endpoints, VersionResolver, VersionSpec};

/// Channel passed to `generate` for Debug builds.
pub const DEVELOPER_CHANNEL: &str = "developer";

/// Channel passed to `generate` for every other build configuration.
pub const RELEASE_CHANNEL: &str = "release";

/// Where the tool version comes from.
#[derive(Debug, Clone)]
pub struct VersionConfig {
    /// Version given on the command line; wins over everything else.
    pub explicit: Option<String>,
    /// Local checkout of the dependency given on the command line.
    pub local_override: Option<PathBuf>,
    /// Project metadata file scanned for the dependency.
    pub project_file: PathBuf,
    /// Dependency name to look for.
    pub dependency: String,
}

impl VersionConfig {
    /// Resolves the tool version.
    ///
    /// Precedence: explicit version, explicit local override, then the
    /// project file (which may itself point at a local override).
    ///
    /// # Errors
    ///
    /// Returns [`FmlError::InvalidVersion`] for a malformed explicit version
    /// and [`FmlError::VersionNotFound`] when no source yields one.
    ///
    /// [`FmlError::InvalidVersion`]: crate::errors::FmlError::InvalidVersion
    /// [`FmlError::VersionNotFound`]: crate::errors::FmlError::VersionNotFound
    pub fn resolve(&self) -> Result<VersionSpec> {
        if let Some(explicit) = &self.explicit {
            debug!(version = %explicit, "Using explicit version");
            return Ok(VersionSpec::parse(explicit)?);
        }

        let resolver = VersionResolver::new(&self.dependency);
        if let Some(dir) = &self.local_override {
            debug!(dir = %dir.display(), "Using explicit local override");
            return resolver.from_local_override(dir);
        }

        resolver.resolve(&self.project_file)
    }
}

/// Inputs of the artifact fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root of the artifact cache.
    pub cache_root: PathBuf,
    /// Base name of the archive, checksum and binary.
    pub tool_name: String,
    /// Download URL templates.
    pub endpoints: Endpoints,
    /// Wipe the cached version even when its checksum is current.
    pub force_refresh: bool,
}

/// Inputs of the `validate` and `generate` invocations.
#[derive(Debug, Clone)]
pub struct InvokeConfig {
    /// Extra repository manifests, passed as `--repo-file` in order.
    pub repo_files: Vec<PathBuf>,
    /// Release channel for `generate`.
    pub channel: String,
    /// Target language for `generate`.
    pub language: String,
    /// Output directory for generated sources.
    pub output: PathBuf,
}

/// Maps an Xcode-style build configuration to a release channel.
#[must_use]
pub fn channel_for_configuration(configuration: Option<&str>) -> &'static str {
    match configuration {
        Some("Debug") => DEVELOPER_CHANNEL,
        _ => RELEASE_CHANNEL,
    }
}
