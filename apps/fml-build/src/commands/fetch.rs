//! Fetch command.
//!
//! Resolves the generator version, makes sure a verified binary is cached,
//! and prints its path. Useful for warming a CI cache or for running the
//! generator by hand.
//!
//! ## Usage
//!
//! ```bash
//! fml-build fetch                        # version from Package.resolved
//! fml-build fetch --fml-version 120.0.1  # explicit version
//! fml-build fetch --fresh                # discard the cached copy first
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::version::VersionArgs;
use crate::artifact::{
    ArtifactCache, ArtifactFetcher, DEFAULT_ARCHIVE_URL, DEFAULT_FALLBACK_URL, Endpoints,
    HttpTransport, VersionSpec,
};
use crate::config::FetchConfig;

/// Arguments for fetching the generator.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub version: VersionArgs,

    /// Discard the cached copy of this version and download it again.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub fresh: bool,

    /// Cache directory (defaults to the user cache directory).
    #[clap(long, env = "FML_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Base name of the archive, checksum and binary.
    #[clap(long, default_value = "fml", value_name = "NAME")]
    pub tool_name: String,

    /// Primary download URL template with {version} and {file} placeholders.
    #[clap(long, env = "FML_ARCHIVE_URL", default_value = DEFAULT_ARCHIVE_URL, value_name = "TEMPLATE")]
    pub archive_url: String,

    /// Fallback download URL template, used when the primary has no checksum.
    #[clap(long, env = "FML_FALLBACK_URL", default_value = DEFAULT_FALLBACK_URL, value_name = "TEMPLATE")]
    pub fallback_url: String,
}

impl FetchArgs {
    /// Returns the cache root, falling back to the user cache directory.
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(ArtifactCache::default_root)
    }

    /// Builds the fetcher settings.
    #[must_use]
    pub fn config(&self) -> FetchConfig {
        FetchConfig {
            cache_root: self.cache_root(),
            tool_name: self.tool_name.clone(),
            endpoints: Endpoints {
                primary: self.archive_url.clone(),
                fallback: self.fallback_url.clone(),
            },
            force_refresh: self.fresh,
        }
    }

    /// Resolves the version and returns it with the path of a verified binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be resolved or the binary
    /// cannot be fetched.
    pub async fn fetch_tool(&self) -> Result<(VersionSpec, PathBuf)> {
        let version = self.version.config().resolve()?;
        info!(%version, "Resolved {} version", self.tool_name);

        let fetcher = ArtifactFetcher::new(HttpTransport::new()?, self.config());
        let binary = fetcher.fetch(&version).await?;
        Ok((version, binary))
    }
}

/// Executes the fetch command.
///
/// # Errors
///
/// Returns an error if resolution, download, verification or extraction fails.
pub async fn execute(args: &FetchArgs) -> Result<()> {
    let (_, binary) = args.fetch_tool().await?;
    println!("{}", binary.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FetchArgs {
        FetchArgs {
            version: VersionArgs {
                fml_version: Some("120.0.1".to_string()),
                local_override: None,
                project_file: PathBuf::from("Package.resolved"),
                dependency: "fml-components".to_string(),
                verbose: false,
            },
            fresh: true,
            cache_dir: Some(PathBuf::from("/tmp/fml-cache")),
            tool_name: "fml".to_string(),
            archive_url: "http://primary/{version}/{file}".to_string(),
            fallback_url: "http://fallback/{version}/{file}".to_string(),
        }
    }

    #[test]
    fn config_maps_flags() {
        let config = args().config();
        assert_eq!(config.cache_root, PathBuf::from("/tmp/fml-cache"));
        assert_eq!(config.endpoints.primary, "http://primary/{version}/{file}");
        assert_eq!(config.endpoints.fallback, "http://fallback/{version}/{file}");
        assert!(config.force_refresh);
    }

    #[test]
    fn cache_root_defaults_to_user_cache() {
        let mut args = args();
        args.cache_dir = None;
        assert_eq!(args.cache_root(), ArtifactCache::default_root());
    }
}
