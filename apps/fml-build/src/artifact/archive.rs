//! Single-binary extraction from the release archive.
//!
//! The archive ships one binary per target under `<triple>/release/`. Only
//! the entry for the host is extracted, flattened to the destination path.

use std::path::Path;

use anyhow::{Context, Result};
use zip::result::ZipError;

use crate::errors::FmlError;

/// Extracts `entry` from a ZIP archive to `dest` and marks it executable.
///
/// The entry's directory components are dropped; `dest` is the full output
/// path. The file is written next to `dest` first and renamed into place, so
/// an interrupted extraction never leaves a partial executable.
///
/// # Errors
///
/// Returns [`FmlError::BinaryNotInArchive`] if the entry does not exist, and an
/// error if the archive is unreadable or the file cannot be written.
pub fn extract_entry(archive_path: &Path, entry: &str, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    let mut zipped = match archive.by_name(entry) {
        Ok(zipped) => zipped,
        Err(ZipError::FileNotFound) => {
            return Err(FmlError::binary_not_in_archive(
                entry,
                archive_path.display().to_string(),
            )
            .into());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read archive entry {entry}"));
        }
    };

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = dest.with_extension("tmp");
    let mut outfile = std::fs::File::create(&temp_path)
        .with_context(|| format!("Failed to create file: {}", temp_path.display()))?;

    std::io::copy(&mut zipped, &mut outfile)
        .with_context(|| format!("Failed to extract: {}", dest.display()))?;
    drop(outfile);

    set_executable_permissions(&temp_path)?;

    std::fs::rename(&temp_path, dest).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            dest.display()
        )
    })?;

    Ok(())
}

/// Sets mode 0o755 on a file (Unix only).
///
/// # Errors
///
/// Returns an error if metadata cannot be read or permissions cannot be set.
#[cfg(unix)]
pub fn set_executable_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Failed to get metadata: {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions: {}", path.display()))
}

/// Sets executable permissions (no-op outside Unix).
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn set_executable_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
