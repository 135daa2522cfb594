//! Sub-process invocation of the generator.
//!
//! The generator is run twice per build, first `validate` and then
//! `generate`. Its standard streams are inherited, so its output reaches the
//! build log unchanged. The first non-zero exit aborts the sequence and is
//! surfaced as [`FmlError::ProcessExitCode`] carrying the same code.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::errors::FmlError;

/// Runs a resolved generator binary.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    binary: PathBuf,
}

impl ToolInvoker {
    /// Creates an invoker for the binary at `binary`. Nothing is checked
    /// until the first run.
    #[must_use]
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Runs each argument vector in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`FmlError::ProcessExitCode`] with the child's exit code (1 if
    /// it was killed by a signal), or an error if the binary cannot be spawned.
    pub fn run_all(&self, invocations: &[Vec<OsString>]) -> Result<()> {
        for args in invocations {
            self.run(args)?;
        }
        Ok(())
    }

    fn run(&self, args: &[OsString]) -> Result<()> {
        info!(
            binary = %self.binary.display(),
            args = ?args,
            "Running {}",
            args.first().map_or_else(String::new, |a| a.to_string_lossy().into_owned())
        );

        let status = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute {}", self.binary.display()))?;

        if !status.success() {
            let code = status.code().unwrap_or(1);
            debug!(code, "Generator failed");
            return Err(FmlError::process_exit_code(code).into());
        }

        Ok(())
    }
}

/// Arguments for `validate [--repo-file <path>]* --cache-dir <dir> <fml_file>`.
#[must_use]
pub fn validate_args(repo_files: &[PathBuf], cache_dir: &Path, fml_file: &Path) -> Vec<OsString> {
    let mut args = vec![OsString::from("validate")];
    push_repo_files(&mut args, repo_files);
    args.push("--cache-dir".into());
    args.push(cache_dir.into());
    args.push(fml_file.into());
    args
}

/// Arguments for `generate [--repo-file <path>]* --channel <name> --language
/// <lang> --cache-dir <dir> <input> <output>`.
#[must_use]
pub fn generate_args(
    repo_files: &[PathBuf],
    channel: &str,
    language: &str,
    cache_dir: &Path,
    input: &Path,
    output: &Path,
) -> Vec<OsString> {
    let mut args = vec![OsString::from("generate")];
    push_repo_files(&mut args, repo_files);
    args.push("--channel".into());
    args.push(channel.into());
    args.push("--language".into());
    args.push(language.into());
    args.push("--cache-dir".into());
    args.push(cache_dir.into());
    args.push(input.into());
    args.push(output.into());
    args
}

fn push_repo_files(args: &mut Vec<OsString>, repo_files: &[PathBuf]) {
    for file in repo_files {
        args.push("--repo-file".into());
        args.push(file.into());
    }
}
