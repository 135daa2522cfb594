//! Artifact endpoints and the URLs derived from them.
//!
//! An endpoint is a URL template with `{version}` and `{file}` placeholders.
//! Released versions live under the primary (archive) endpoint; versions that
//! were never published are still reachable through the CI artifact index,
//! which is the fallback.

use std::fmt;

use super::version::VersionSpec;

/// Default template for published releases.
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive.example/pub/releases/{version}/{file}";

/// Default template for the CI artifact index.
pub const DEFAULT_FALLBACK_URL: &str =
    "https://ci.example/api/index/v1/task/fml.v2.{version}/artifacts/public/build/{file}";

/// Which endpoint a location was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// The release archive.
    Primary,
    /// The CI artifact index.
    Fallback,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// The pair of endpoint templates to try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Template tried first.
    pub primary: String,
    /// Template used when the primary checksum is not served.
    pub fallback: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            primary: DEFAULT_ARCHIVE_URL.to_string(),
            fallback: DEFAULT_FALLBACK_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Builds the location for a version at the given endpoint.
    #[must_use]
    pub fn locate(&self, endpoint: Endpoint, version: &VersionSpec, name: &str) -> ArtifactLocation {
        let template = match endpoint {
            Endpoint::Primary => &self.primary,
            Endpoint::Fallback => &self.fallback,
        };
        ArtifactLocation {
            endpoint,
            checksum_url: expand(template, version, &checksum_file_name(name)),
            archive_url: expand(template, version, &archive_file_name(name)),
        }
    }
}

/// Checksum and archive URLs for one version at one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Endpoint the URLs were built from.
    pub endpoint: Endpoint,
    /// URL of `<name>.sha256`.
    pub checksum_url: String,
    /// URL of `<name>.zip`.
    pub archive_url: String,
}

/// File name of the archive for a tool.
#[must_use]
pub fn archive_file_name(name: &str) -> String {
    format!("{name}.zip")
}

/// File name of the checksum for a tool.
#[must_use]
pub fn checksum_file_name(name: &str) -> String {
    format!("{name}.sha256")
}

fn expand(template: &str, version: &VersionSpec, file: &str) -> String {
    template
        .replace("{version}", version.as_str())
        .replace("{file}", file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(v: &str) -> VersionSpec {
        VersionSpec::parse(v).unwrap()
    }

    #[test]
    fn primary_location_uses_normalized_version() {
        let location = Endpoints::default().locate(Endpoint::Primary, &version("120.0.1"), "fml");
        assert_eq!(location.endpoint, Endpoint::Primary);
        assert_eq!(
            location.checksum_url,
            "https://archive.example/pub/releases/120.1/fml.sha256"
        );
        assert_eq!(
            location.archive_url,
            "https://archive.example/pub/releases/120.1/fml.zip"
        );
    }

    #[test]
    fn fallback_location_uses_ci_index() {
        let location = Endpoints::default().locate(Endpoint::Fallback, &version("121.0"), "fml");
        assert_eq!(location.endpoint, Endpoint::Fallback);
        assert_eq!(
            location.archive_url,
            "https://ci.example/api/index/v1/task/fml.v2.121.0/artifacts/public/build/fml.zip"
        );
        assert!(location.checksum_url.ends_with("/build/fml.sha256"));
    }

    #[test]
    fn custom_templates_are_expanded() {
        let endpoints = Endpoints {
            primary: "http://127.0.0.1:8080/r/{version}/{file}".to_string(),
            fallback: "http://127.0.0.1:8080/ci/{file}?v={version}".to_string(),
        };
        let location = endpoints.locate(Endpoint::Fallback, &version("2.3.4"), "gen");
        assert_eq!(location.checksum_url, "http://127.0.0.1:8080/ci/gen.sha256?v=2.3.4");
    }

    #[test]
    fn endpoint_display() {
        assert_eq!(Endpoint::Primary.to_string(), "primary");
        assert_eq!(Endpoint::Fallback.to_string(), "fallback");
    }
}
