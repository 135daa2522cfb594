//! Tool version resolution.
//!
//! The generator version is not configured directly by projects; it is pinned
//! by the version of the components package the project depends on. Two
//! strategies recover it:
//!
//! - [`VersionResolver::from_repo_metadata`] scans the dependency metadata
//!   (e.g. SwiftPM's `Package.resolved`) for the components package and takes
//!   the first `MAJOR.MINOR.PATCH` that follows its name.
//! - [`VersionResolver::from_local_override`] reads the `Package.swift` of a
//!   local checkout of the components package, which declares a two-part
//!   `version = "MAJOR.MINOR"`.
//!
//! Upstream tags the components package `120.0.1` for generator release
//! `120.1`, so a `.0.` middle segment is collapsed during normalization.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::errors::FmlError;

/// File read from a local override checkout.
pub const LOCAL_MANIFEST_FILE: &str = "Package.swift";

static DOTTED_TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("Invalid dotted triple regex"));

static LOCAL_MANIFEST_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"version\s*=\s*"(\d+\.\d+(?:\.\d+)?)""#)
        .expect("Invalid local manifest version regex")
});

/// A normalized tool version (`120.1`, `121.0`, `2.3.4`).
///
/// Only constructed through [`VersionSpec::parse`], so a value always holds two
/// or three numeric segments with any `.0.` middle segment collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec(String);

impl VersionSpec {
    /// Normalizes and validates a version string.
    ///
    /// # Errors
    ///
    /// Returns [`FmlError::InvalidVersion`] if the normalized value is not two
    /// or three dot-separated numbers.
    pub fn parse(input: &str) -> Result<Self, FmlError> {
        let normalized = normalize(input.trim());
        if is_numeric_dotted(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(FmlError::invalid_version(input))
        }
    }

    /// Returns the normalized version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapses the middle segment of `A.0.C` to give `A.C`.
///
/// Anything else is returned unchanged, which makes the function idempotent.
#[must_use]
pub fn normalize(version: &str) -> String {
    match version.split('.').collect::<Vec<_>>().as_slice() {
        [major, "0", patch] => format!("{major}.{patch}"),
        _ => version.to_string(),
    }
}

fn is_numeric_dotted(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Derives the tool version from project metadata.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    dependency: String,
}

impl VersionResolver {
    /// Creates a resolver looking for the given components package name.
    #[must_use]
    pub fn new(dependency: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
        }
    }

    /// Resolves the version from a metadata file, trying the declared
    /// dependency first and a local override declaration second.
    ///
    /// # Errors
    ///
    /// Returns [`FmlError::VersionNotFound`] if the file cannot be read or
    /// neither strategy finds a version.
    pub fn resolve(&self, metadata_path: &Path) -> Result<VersionSpec> {
        let text = std::fs::read_to_string(metadata_path).map_err(|e| {
            FmlError::version_not_found(format!(
                "cannot read project metadata {}: {e}",
                metadata_path.display()
            ))
        })?;

        if let Some(version) = self.from_repo_metadata(&text)? {
            debug!(%version, file = %metadata_path.display(), "Version found in dependency metadata");
            return Ok(version);
        }

        if let Some(declared) = self.local_override_path(&text)? {
            let base = metadata_path.parent().unwrap_or_else(|| Path::new("."));
            let dir = base.join(declared);
            debug!(dir = %dir.display(), "Following local override declaration");
            return self.from_local_override(&dir);
        }

        Err(FmlError::version_not_found(format!(
            "no '{}' dependency or local override in {}",
            self.dependency,
            metadata_path.display()
        ))
        .into())
    }

    /// Returns the first dotted triple following the dependency name, within
    /// the same pin (up to the next closing brace). A pin without a version,
    /// such as a branch or revision pin, yields `None`.
    ///
    /// # Errors
    ///
    /// Only fails if the matched text does not normalize, which the pattern
    /// rules out in practice.
    pub fn from_repo_metadata(&self, text: &str) -> Result<Option<VersionSpec>> {
        let Some(start) = text.find(&self.dependency) else {
            return Ok(None);
        };
        let pin = &text[start..];
        let pin = pin.find('}').map_or(pin, |end| &pin[..end]);
        let Some(found) = DOTTED_TRIPLE.captures(pin) else {
            return Ok(None);
        };
        Ok(Some(VersionSpec::parse(&found[1])?))
    }

    /// Returns the path of a local checkout declared in the metadata, if any.
    ///
    /// Recognizes `relativePath = "..."` (Xcode project files) and
    /// `path: "..."` (`Package.swift`) where the path names the dependency.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration pattern cannot be compiled.
    pub fn local_override_path(&self, text: &str) -> Result<Option<PathBuf>> {
        let pattern = format!(
            r#"(?:relativePath\s*=|path\s*:)\s*"([^"]*{}[^"]*)""#,
            regex::escape(&self.dependency)
        );
        let declaration = Regex::new(&pattern).context("Invalid local override pattern")?;
        Ok(declaration
            .captures(text)
            .map(|c| PathBuf::from(&c[1])))
    }

    /// Reads the version from `Package.swift` in a local checkout.
    ///
    /// # Errors
    ///
    /// Returns [`FmlError::VersionNotFound`] if the manifest is missing or has
    /// no version declaration, and [`FmlError::InvalidVersion`] if it declares
    /// something that is not a dotted version.
    pub fn from_local_override(&self, dir: &Path) -> Result<VersionSpec> {
        let manifest = dir.join(LOCAL_MANIFEST_FILE);
        let text = std::fs::read_to_string(&manifest).map_err(|e| {
            FmlError::version_not_found(format!(
                "cannot read local override manifest {}: {e}",
                manifest.display()
            ))
        })?;

        let found = LOCAL_MANIFEST_VERSION.captures(&text).ok_or_else(|| {
            FmlError::version_not_found(format!(
                "no version declaration in {}",
                manifest.display()
            ))
        })?;

        Ok(VersionSpec::parse(&found[1])?)
    }
}
