//! Host architecture detection.
//!
//! The release archive bundles one generator binary per target. The entry
//! extracted for the host is chosen from the CPU architecture alone:
//!
//! - `x86_64` → `x86_64-apple-darwin/release/<name>`
//! - `arm64`  → `aarch64-apple-darwin/release/<name>`

use std::fmt;

use crate::errors::FmlError;

/// CPU architecture of the build host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// Intel / AMD 64-bit.
    X86_64,
    /// ARM 64-bit (Apple Silicon).
    Arm64,
    /// Anything else; carries the reported name for error messages.
    Unsupported(String),
}

impl Architecture {
    /// Detects the architecture of the running process.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_host(std::env::consts::ARCH)
    }

    /// Maps a host architecture name to an [`Architecture`].
    ///
    /// Accepts both Rust target names (`aarch64`) and `uname -m` names (`arm64`).
    #[must_use]
    pub fn from_host(arch: &str) -> Self {
        match arch {
            "x86_64" | "amd64" => Self::X86_64,
            "aarch64" | "arm64" => Self::Arm64,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Returns the archive-internal path of the binary for this architecture.
    ///
    /// # Errors
    ///
    /// Returns [`FmlError::UnsupportedArchitecture`] for
    /// [`Architecture::Unsupported`].
    pub fn archive_entry(&self, binary_name: &str) -> Result<String, FmlError> {
        let target = match self {
            Self::X86_64 => "x86_64-apple-darwin",
            Self::Arm64 => "aarch64-apple-darwin",
            Self::Unsupported(arch) => return Err(FmlError::unsupported_architecture(arch)),
        };
        Ok(format!("{target}/release/{binary_name}"))
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => write!(f, "x86_64"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Unsupported(arch) => write!(f, "{arch}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_host_maps_known_names() {
        assert_eq!(Architecture::from_host("x86_64"), Architecture::X86_64);
        assert_eq!(Architecture::from_host("amd64"), Architecture::X86_64);
        assert_eq!(Architecture::from_host("aarch64"), Architecture::Arm64);
        assert_eq!(Architecture::from_host("arm64"), Architecture::Arm64);
    }

    #[test]
    fn from_host_keeps_unknown_name() {
        assert_eq!(
            Architecture::from_host("riscv64"),
            Architecture::Unsupported("riscv64".to_string())
        );
    }

    #[test]
    fn archive_entry_per_architecture() {
        assert_eq!(
            Architecture::X86_64.archive_entry("fml").unwrap(),
            "x86_64-apple-darwin/release/fml"
        );
        assert_eq!(
            Architecture::Arm64.archive_entry("fml").unwrap(),
            "aarch64-apple-darwin/release/fml"
        );
    }

    #[test]
    fn archive_entry_fails_for_unsupported() {
        let err = Architecture::from_host("ppc64le")
            .archive_entry("fml")
            .unwrap_err();
        assert!(matches!(err, FmlError::UnsupportedArchitecture { ref arch } if arch == "ppc64le"));
    }

    #[test]
    fn display_matches_host_naming() {
        assert_eq!(Architecture::X86_64.to_string(), "x86_64");
        assert_eq!(Architecture::Arm64.to_string(), "arm64");
        assert_eq!(Architecture::Unsupported("s390x".into()).to_string(), "s390x");
    }

    #[test]
    fn detect_matches_compile_target() {
        let arch = Architecture::detect();
        #[cfg(target_arch = "x86_64")]
        assert_eq!(arch, Architecture::X86_64);
        #[cfg(target_arch = "aarch64")]
        assert_eq!(arch, Architecture::Arm64);
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        assert!(matches!(arch, Architecture::Unsupported(_)));
    }
}
