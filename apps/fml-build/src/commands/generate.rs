//! Generate command (the default).
//!
//! Runs the whole build step: resolve the generator version, fetch a
//! verified binary, then run `validate` and `generate` on the feature
//! manifest.
//!
//! ## Execution Pipeline
//!
//! 1. **Check** - The manifest file exists
//! 2. **Resolve** - Explicit version, local override, or project metadata
//! 3. **Fetch** - Cached binary, refreshed when the remote checksum changed
//! 4. **Validate** - `fml validate ... <FML_FILE>`
//! 5. **Generate** - `fml generate ... <FML_FILE> <OUTPUT>`
//!
//! Both invocations share `<cache root>/repo-cache` as the generator's own
//! cache directory.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use super::fetch::FetchArgs;
use crate::artifact::ArtifactCache;
use crate::config::{InvokeConfig, channel_for_configuration};
use crate::invoker::{ToolInvoker, generate_args, validate_args};

/// Arguments for the generate command.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Feature manifest to validate and generate from.
    #[clap(value_name = "FML_FILE", required = true)]
    pub fml_file: Option<PathBuf>,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Directory for generated sources.
    #[clap(short = 'o', long, default_value = "Generated", value_name = "DIR")]
    pub output: PathBuf,

    /// Additional repository manifest; may be repeated.
    #[clap(long = "repo-file", value_name = "PATH")]
    pub repo_files: Vec<PathBuf>,

    /// Release channel (defaults from the build configuration).
    #[clap(long, env = "FML_CHANNEL", value_name = "NAME")]
    pub channel: Option<String>,

    /// Build configuration; "Debug" selects the developer channel.
    #[clap(long, env = "CONFIGURATION", hide = true)]
    pub configuration: Option<String>,

    /// Target language.
    #[clap(long, default_value = "swift", value_name = "LANG")]
    pub language: String,
}

impl GenerateArgs {
    /// Builds the invocation settings.
    #[must_use]
    pub fn config(&self) -> InvokeConfig {
        let channel = self.channel.clone().unwrap_or_else(|| {
            channel_for_configuration(self.configuration.as_deref()).to_string()
        });
        InvokeConfig {
            repo_files: self.repo_files.clone(),
            channel,
            language: self.language.clone(),
            output: self.output.clone(),
        }
    }
}

/// Executes the generate command.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest file does not exist
/// - The version cannot be resolved
/// - The binary cannot be fetched or verified
/// - Either generator invocation exits non-zero (as `ProcessExitCode`)
pub async fn execute(args: &GenerateArgs) -> Result<()> {
    let fml_file = args.fml_file.as_deref().context("Missing FML_FILE")?;
    if !fml_file.exists() {
        bail!("FML file not found: {}", fml_file.display());
    }

    let config = args.config();
    let (version, binary) = args.fetch.fetch_tool().await?;
    let cache_dir = ArtifactCache::new(args.fetch.cache_root()).repo_cache_dir();

    info!(
        %version,
        input = %fml_file.display(),
        output = %config.output.display(),
        channel = %config.channel,
        "Generating {} sources",
        config.language
    );

    ToolInvoker::new(binary).run_all(&[
        validate_args(&config.repo_files, &cache_dir, fml_file),
        generate_args(
            &config.repo_files,
            &config.channel,
            &config.language,
            &cache_dir,
            fml_file,
            &config.output,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::version::VersionArgs;

    fn args() -> GenerateArgs {
        GenerateArgs {
            fml_file: Some(PathBuf::from("app.fml.yaml")),
            fetch: FetchArgs {
                version: VersionArgs {
                    fml_version: Some("120.1".to_string()),
                    local_override: None,
                    project_file: PathBuf::from("Package.resolved"),
                    dependency: "fml-components".to_string(),
                    verbose: false,
                },
                fresh: false,
                cache_dir: None,
                tool_name: "fml".to_string(),
                archive_url: String::new(),
                fallback_url: String::new(),
            },
            output: PathBuf::from("Generated"),
            repo_files: vec![],
            channel: None,
            configuration: None,
            language: "swift".to_string(),
        }
    }

    #[test]
    fn channel_defaults_to_release() {
        assert_eq!(args().config().channel, "release");
    }

    #[test]
    fn debug_configuration_selects_developer_channel() {
        let mut args = args();
        args.configuration = Some("Debug".to_string());
        assert_eq!(args.config().channel, "developer");
    }

    #[test]
    fn explicit_channel_wins() {
        let mut args = args();
        args.configuration = Some("Debug".to_string());
        args.channel = Some("beta".to_string());
        assert_eq!(args.config().channel, "beta");
    }

    #[tokio::test]
    async fn missing_manifest_fails_before_fetching() {
        let mut args = args();
        args.fml_file = Some(PathBuf::from("/nonexistent/app.fml.yaml"));

        let err = execute(&args).await.unwrap_err();
        assert!(err.to_string().contains("FML file not found"));
    }
}
