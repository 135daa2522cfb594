//! Tool artifact resolution.
//!
//! Resolves which generator version a project needs, downloads it from the
//! primary or fallback endpoint, verifies it, and keeps it in a per-version
//! cache.

pub mod archive;
pub mod cache;
pub mod download;
pub mod fetcher;
pub mod location;
pub mod platform;
pub mod transport;
pub mod verify;
pub mod version;

pub use cache::ArtifactCache;
pub use fetcher::ArtifactFetcher;
pub use location::{DEFAULT_ARCHIVE_URL, DEFAULT_FALLBACK_URL, Endpoints};
pub use transport::HttpTransport;
pub use version::{VersionResolver, VersionSpec};
