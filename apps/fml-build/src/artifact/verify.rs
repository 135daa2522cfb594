//! Checksum verification for downloaded archives.
//!
//! Checksum files hold a lowercase hex SHA-256 digest, optionally followed by
//! a file name as written by `sha256sum`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::errors::FmlError;

/// Verifies that a file matches the expected SHA-256 digest.
///
/// # Errors
///
/// Returns [`FmlError::ChecksumMismatch`] if the digests differ, and an I/O
/// error if the file cannot be read.
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<()> {
    let computed = compute_sha256(file_path)?;
    let expected = expected.to_lowercase();

    if computed != expected {
        return Err(FmlError::checksum_mismatch(
            file_path.display().to_string(),
            expected,
            computed,
        )
        .into());
    }

    Ok(())
}

/// Extracts the digest from checksum file contents.
///
/// Returns the first whitespace-separated token, or an empty string for an
/// empty file (which never matches a real digest).
#[must_use]
pub fn parse_checksum(contents: &str) -> &str {
    contents.split_whitespace().next().unwrap_or("")
}

/// Computes the SHA-256 hash of a file as a lowercase hex string.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open file for checksum: {}", file_path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).with_context(|| {
            format!("Failed to read file for checksum: {}", file_path.display())
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const HELLO_SHA256: &str = "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447";

    #[test]
    fn compute_sha256_produces_correct_hash() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("hello.txt");
        file.write_str("hello world\n").unwrap();

        assert_eq!(compute_sha256(file.path()).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn verify_checksum_accepts_uppercase_expected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("hello.txt");
        file.write_str("hello world\n").unwrap();

        verify_checksum(file.path(), &HELLO_SHA256.to_uppercase()).unwrap();
    }

    #[test]
    fn verify_checksum_reports_mismatch() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("hello.txt");
        file.write_str("hello world\n").unwrap();

        let err = verify_checksum(file.path(), "0badc0de").unwrap_err();
        match err.downcast_ref::<FmlError>() {
            Some(FmlError::ChecksumMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, "0badc0de");
                assert_eq!(actual, HELLO_SHA256);
            }
            other => panic!("Expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn verify_sha256sum_style_contents() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("fml.zip");
        file.write_str("hello world\n").unwrap();
        let contents = format!("{HELLO_SHA256}  fml.zip\n");

        verify_checksum(file.path(), parse_checksum(&contents)).unwrap();
    }

    #[test]
    fn empty_checksum_contents_never_match() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("fml.zip");
        file.write_str("hello world\n").unwrap();

        assert!(verify_checksum(file.path(), parse_checksum("")).is_err());
    }

    #[test]
    fn parse_checksum_takes_first_token() {
        assert_eq!(parse_checksum("abc123  fml.zip\n"), "abc123");
        assert_eq!(parse_checksum("abc123\n"), "abc123");
        assert_eq!(parse_checksum("   "), "");
    }

    #[test]
    fn compute_sha256_fails_for_nonexistent_file() {
        assert!(compute_sha256(Path::new("/nonexistent/file/path")).is_err());
    }
}
