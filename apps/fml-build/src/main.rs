#![warn(clippy::pedantic)]

//! # fml-build
//!
//! Build-step wrapper for the FML code generator. It works out which
//! generator version a project pins, keeps a verified copy of that binary in
//! a per-version cache, and runs it to validate a feature manifest and
//! generate sources from it.
//!
//! ## Subcommands
//!
//! - (none) - Validate and generate from `<FML_FILE>`
//! - `fetch` - Make sure the binary is cached and print its path
//! - `tool-version` - Print the resolved generator version
//!
//! ## Examples
//!
//! Generate Swift sources into `Generated/`:
//! ```bash
//! fml-build app.fml.yaml
//! ```
//!
//! Pin a version and discard the cached copy:
//! ```bash
//! fml-build --fml-version 120.0.1 --fresh app.fml.yaml
//! ```

mod artifact;
mod commands;
mod config;
mod errors;
mod invoker;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{fetch, generate, version};
use errors::FmlError;

/// Fetches, verifies and runs the FML code generator.
#[derive(Parser)]
#[command(
    name = "fml-build",
    author,
    version,
    about = "Fetches, verifies and runs the FML code generator",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
    after_help = "\
VERSION RESOLUTION:
    The generator version is chosen using the following priority order:
    1. --fml-version / FML_VERSION
    2. --local-override / FML_LOCAL_OVERRIDE (reads <DIR>/Package.swift)
    3. The fml-components pin in --project-file (default: Package.resolved)
    4. A local fml-components path declared in --project-file

ENVIRONMENT VARIABLES:
    FML_CACHE_DIR           Cache directory (default: <user cache>/fml-build)
    FML_ARCHIVE_URL         Primary URL template ({version}, {file})
    FML_FALLBACK_URL        Fallback URL template ({version}, {file})
    FML_CHANNEL             Release channel passed to generate
    CONFIGURATION           Build configuration; Debug selects the developer channel
    RUST_LOG                Log filter (overrides --verbose)"
)]
pub struct Cli {
    /// The subcommand to execute; validate + generate when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub generate: generate::GenerateArgs,
}

/// Available subcommands for the fml-build CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the generator and print the path of the verified binary.
    Fetch(fetch::FetchArgs),

    /// Print the generator version the project resolves to.
    #[command(name = "tool-version")]
    ToolVersion(version::VersionArgs),
}

impl Cli {
    fn verbose(&self) -> bool {
        match &self.command {
            Some(Commands::Fetch(args)) => args.version.verbose,
            Some(Commands::ToolVersion(args)) => args.verbose,
            None => self.generate.fetch.version.verbose,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Handles an error and returns the appropriate exit code.
///
/// For `ProcessExitCode` errors, returns the embedded exit code without
/// printing an error message (the generator already printed its output).
/// For all other errors, prints the error and returns exit code 1.
fn handle_error(e: &anyhow::Error) -> i32 {
    if let Some(FmlError::ProcessExitCode { code }) = e.downcast_ref::<FmlError>() {
        return *code;
    }
    eprintln!("Error: {e:?}");
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose())?;

    match cli.command {
        Some(Commands::Fetch(args)) => fetch::execute(&args).await,
        Some(Commands::ToolVersion(args)) => version::execute(&args),
        None => generate::execute(&cli.generate).await,
    }
}
