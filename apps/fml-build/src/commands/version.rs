//! Tool version command.
//!
//! Prints the generator version the project needs, after normalization,
//! without touching the network or the cache.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::VersionConfig;

/// Arguments shared by every command: version resolution and verbosity.
#[derive(Args, Debug, Clone)]
pub struct VersionArgs {
    /// Generator version to use instead of deriving it (e.g. "120.0.1").
    #[clap(long = "fml-version", env = "FML_VERSION", value_name = "VERSION")]
    pub fml_version: Option<String>,

    /// Local checkout of the components package to read the version from.
    #[clap(long, env = "FML_LOCAL_OVERRIDE", value_name = "DIR")]
    pub local_override: Option<PathBuf>,

    /// Project metadata scanned for the components dependency.
    #[clap(
        long,
        env = "FML_PROJECT_FILE",
        default_value = "Package.resolved",
        value_name = "PATH"
    )]
    pub project_file: PathBuf,

    /// Name of the components package that pins the generator version.
    #[clap(long, default_value = "fml-components", value_name = "NAME")]
    pub dependency: String,

    /// Enable debug logging.
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

impl VersionArgs {
    /// Builds the version resolution settings.
    #[must_use]
    pub fn config(&self) -> VersionConfig {
        VersionConfig {
            explicit: self.fml_version.clone(),
            local_override: self.local_override.clone(),
            project_file: self.project_file.clone(),
            dependency: self.dependency.clone(),
        }
    }
}

/// Executes the tool-version command.
///
/// # Errors
///
/// Returns an error if no version can be resolved.
pub fn execute(args: &VersionArgs) -> Result<()> {
    let version = args.config().resolve()?;
    println!("{version}");
    Ok(())
}
