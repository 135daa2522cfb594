//! Error types for the fml-build wrapper.
//!
//! Every failure is fatal. Most code propagates `anyhow::Result` with context;
//! the variants below are raised where callers (and `main`) need to tell the
//! failure kinds apart, and are recovered with `downcast_ref`.

use thiserror::Error;

/// Typed failures of the fetch-and-run pipeline.
#[derive(Debug, Error)]
pub enum FmlError {
    /// No version could be derived from the project metadata or a local override.
    #[error("version not found: {message}")]
    VersionNotFound {
        /// What was searched.
        message: String,
    },

    /// A version string did not normalize to a numeric dotted version.
    #[error("invalid version '{input}': expected MAJOR.MINOR or MAJOR.MINOR.PATCH")]
    InvalidVersion {
        /// The rejected input.
        input: String,
    },

    /// A network or HTTP error while talking to an artifact endpoint.
    #[error("download failed for {url}: {message}")]
    DownloadFailure {
        /// The URL being fetched.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The downloaded archive does not match its checksum file.
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The verified file.
        file: String,
        /// Digest recorded in the checksum file.
        expected: String,
        /// Digest computed from the file contents.
        actual: String,
    },

    /// The host CPU has no binary in the artifact archive.
    #[error("unsupported architecture: {arch} (supported: x86_64, arm64)")]
    UnsupportedArchitecture {
        /// The host architecture as reported by the platform.
        arch: String,
    },

    /// The archive does not contain the entry for this architecture.
    #[error("'{entry}' not found in archive {archive}")]
    BinaryNotInArchive {
        /// Archive-internal path that was looked up.
        entry: String,
        /// The archive file.
        archive: String,
    },

    /// The external tool exited with a non-zero code.
    ///
    /// The wrapper exits with the same code and prints nothing further; the
    /// tool already wrote its own diagnostics.
    #[error("process exited with code {code}")]
    ProcessExitCode {
        /// Exit code of the sub-process.
        code: i32,
    },
}

impl FmlError {
    /// Creates a new `VersionNotFound` error.
    #[must_use]
    pub fn version_not_found(message: impl Into<String>) -> Self {
        Self::VersionNotFound {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidVersion` error.
    #[must_use]
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    /// Creates a new `DownloadFailure` error.
    #[must_use]
    pub fn download_failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DownloadFailure {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(
        file: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            file: file.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `UnsupportedArchitecture` error.
    #[must_use]
    pub fn unsupported_architecture(arch: impl Into<String>) -> Self {
        Self::UnsupportedArchitecture { arch: arch.into() }
    }

    /// Creates a new `BinaryNotInArchive` error.
    #[must_use]
    pub fn binary_not_in_archive(entry: impl Into<String>, archive: impl Into<String>) -> Self {
        Self::BinaryNotInArchive {
            entry: entry.into(),
            archive: archive.into(),
        }
    }

    /// Creates a new `ProcessExitCode` error.
    #[must_use]
    pub const fn process_exit_code(code: i32) -> Self {
        Self::ProcessExitCode { code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_not_found_displays_message() {
        let err = FmlError::version_not_found("no 'fml-components' in Package.resolved");
        assert_eq!(
            err.to_string(),
            "version not found: no 'fml-components' in Package.resolved"
        );
    }

    #[test]
    fn checksum_mismatch_displays_both_values() {
        let err = FmlError::checksum_mismatch("fml.zip", "abc123", "def456");
        assert_eq!(
            err.to_string(),
            "checksum mismatch for fml.zip: expected abc123, got def456"
        );
    }

    #[test]
    fn unsupported_architecture_names_the_host() {
        let err = FmlError::unsupported_architecture("riscv64");
        assert!(err.to_string().contains("riscv64"));
    }

    #[test]
    fn download_failure_includes_url() {
        let err = FmlError::download_failure("https://archive.example/x.zip", "HTTP 500");
        assert_eq!(
            err.to_string(),
            "download failed for https://archive.example/x.zip: HTTP 500"
        );
    }

    #[test]
    fn process_exit_code_displays_code() {
        let err = FmlError::process_exit_code(42);
        assert_eq!(err.to_string(), "process exited with code 42");
    }

    #[test]
    fn errors_survive_anyhow_round_trip() {
        let err: anyhow::Error = FmlError::process_exit_code(3).into();
        assert!(matches!(
            err.downcast_ref::<FmlError>(),
            Some(FmlError::ProcessExitCode { code: 3 })
        ));
    }
}
