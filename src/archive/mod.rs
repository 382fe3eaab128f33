//! Archive expansion and directory flattening.
//!
//! Fetched asset bytes are classified by content signature — never by file
//! name — and either expanded into the destination directory or copied
//! verbatim as a single opaque file:
//!
//! | `extract` | signature  | action                                   |
//! |-----------|------------|------------------------------------------|
//! | true      | zip        | expand all entries, preserving paths     |
//! | true      | gzip + tar | decompress, expand all entries           |
//! | true      | other      | copy verbatim (flag has no effect)       |
//! | false     | any        | copy verbatim, named after the asset     |
//!
//! Extraction validates every entry path before writing anything: an
//! absolute path, a `..` traversal, or a link pointing outside the
//! destination fails the whole archive with
//! [`GhrabError::UnsafeArchivePath`] and leaves the destination untouched.
//! Overwrites at the same relative path are permitted (last write wins).

use crate::core::GhrabError;
use crate::utils;
use anyhow::Result;
use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use std::path::{Component, Path};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
// "ustar" at offset 257 of the first tar header block, shared by the POSIX
// and GNU variants.
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";

/// Container format detected from a byte blob's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Zip archive (local-file-header or empty-archive magic).
    Zip,
    /// Gzip stream wrapping a tar archive.
    TarGz,
    /// Anything else; copied verbatim.
    Opaque,
}

/// Classify a byte blob by its content signature.
///
/// A gzip stream only counts as `TarGz` when the first decompressed block
/// carries the ustar magic; a gzipped non-tar file stays `Opaque`.
#[must_use]
pub fn classify(bytes: &[u8]) -> ArchiveFormat {
    if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC) {
        return ArchiveFormat::Zip;
    }
    if bytes.starts_with(&GZIP_MAGIC) && gzip_wraps_tar(bytes) {
        return ArchiveFormat::TarGz;
    }
    ArchiveFormat::Opaque
}

fn gzip_wraps_tar(bytes: &[u8]) -> bool {
    let mut decoder = GzDecoder::new(Cursor::new(bytes));
    let mut header = [0u8; 512];
    match decoder.read_exact(&mut header) {
        Ok(()) => &header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()] == TAR_MAGIC,
        Err(_) => false,
    }
}

/// Expand asset bytes into `dest`, or copy them verbatim.
///
/// `asset_name` names the file written in the verbatim cases. `dest` and any
/// needed parents are created. See the module docs for the behavior matrix.
pub fn expand(bytes: &[u8], asset_name: &str, dest: &Path, extract: bool) -> Result<()> {
    if !extract {
        return copy_verbatim(bytes, asset_name, dest);
    }

    match classify(bytes) {
        ArchiveFormat::Zip => {
            tracing::debug!("expanding {asset_name} as zip into {}", dest.display());
            extract_zip(bytes, dest)
        }
        ArchiveFormat::TarGz => {
            tracing::debug!("expanding {asset_name} as tar.gz into {}", dest.display());
            extract_tar_gz(bytes, dest)
        }
        ArchiveFormat::Opaque => {
            tracing::debug!("{asset_name} is not an archive, copying verbatim");
            copy_verbatim(bytes, asset_name, dest)
        }
    }
}

/// Write the raw bytes as a single file named after the asset.
fn copy_verbatim(bytes: &[u8], asset_name: &str, dest: &Path) -> Result<()> {
    utils::ensure_dir(dest)?;
    let target = dest.join(asset_name);
    std::fs::write(&target, bytes).map_err(|e| fs_error("write", &target, &e))?;
    Ok(())
}

fn extract_zip(bytes: &[u8], dest: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        GhrabError::Other {
            message: format!("unreadable zip archive: {e}"),
        }
    })?;

    // Validate every entry before writing anything, so a traversal attempt
    // rejects the archive without partial extraction.
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| GhrabError::Other {
            message: format!("unreadable zip entry: {e}"),
        })?;
        if entry.enclosed_name().is_none() {
            return Err(GhrabError::UnsafeArchivePath {
                entry: entry.name().to_string(),
            }
            .into());
        }
    }

    utils::ensure_dir(dest)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| GhrabError::Other {
            message: format!("unreadable zip entry: {e}"),
        })?;
        // Validated above.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            utils::ensure_dir(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            utils::ensure_dir(parent)?;
        }
        let mut out =
            std::fs::File::create(&target).map_err(|e| fs_error("create", &target, &e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| fs_error("write", &target, &e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

fn extract_tar_gz(bytes: &[u8], dest: &Path) -> Result<()> {
    // Pass 1: validate all entry paths and link targets. The gzip stream is
    // not seekable, so the write pass below re-opens a fresh decoder.
    let mut archive = tar::Archive::new(GzDecoder::new(Cursor::new(bytes)));
    for entry in archive.entries().map_err(tar_error)? {
        let entry = entry.map_err(tar_error)?;
        let path = entry.path().map_err(tar_error)?.into_owned();

        if is_unsafe_entry_path(&path) {
            return Err(GhrabError::UnsafeArchivePath {
                entry: path.display().to_string(),
            }
            .into());
        }

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let target = entry.link_name().map_err(tar_error)?;
            match target {
                Some(target) if !link_escapes(&path, &target) => {}
                _ => {
                    return Err(GhrabError::UnsafeArchivePath {
                        entry: path.display().to_string(),
                    }
                    .into());
                }
            }
        }
    }

    // Pass 2: unpack.
    utils::ensure_dir(dest)?;
    let mut archive = tar::Archive::new(GzDecoder::new(Cursor::new(bytes)));
    for entry in archive.entries().map_err(tar_error)? {
        let mut entry = entry.map_err(tar_error)?;
        let path = entry.path().map_err(tar_error)?.into_owned();

        // Some archives carry a bare "." entry; nothing to write for it.
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let target = dest.join(&path);
        if let Some(parent) = target.parent() {
            utils::ensure_dir(parent)?;
        }
        entry.unpack(&target).map_err(|e| fs_error("unpack", &target, &e))?;
    }

    Ok(())
}

fn is_unsafe_entry_path(path: &Path) -> bool {
    path.is_absolute()
        || path.components().any(|c| {
            matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir)
        })
}

/// Lexically resolve a link target against its entry's parent directory and
/// check whether it stays inside the extraction root.
fn link_escapes(entry_path: &Path, target: &Path) -> bool {
    if target.is_absolute()
        || target
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return true;
    }

    let mut depth: isize = entry_path.components().count() as isize - 1;
    for component in target.components() {
        match component {
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            Component::Normal(_) => depth += 1,
            _ => {}
        }
    }
    false
}

/// Collapse a single wrapping top-level directory.
///
/// When `dir` contains exactly one immediate child and that child is a
/// directory, its entries are promoted one level up and the empty wrapper is
/// removed; returns `Ok(true)`. Any other shape — empty directory, multiple
/// children, or a single file child — is a no-op returning `Ok(false)`:
/// an already-flat archive must not turn the flag into an error.
pub fn flatten_single_dir(dir: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(dir).map_err(|e| fs_error("read", dir, &e))?;
    let first = match entries.next() {
        Some(entry) => entry.map_err(|e| fs_error("read", dir, &e))?,
        None => return Ok(false),
    };
    if entries.next().is_some() || !first.path().is_dir() {
        return Ok(false);
    }

    // Move the wrapper aside first: one of its children may carry the same
    // name as the wrapper itself.
    let wrapper_name = first.file_name();
    let staging = dir.join(format!(".{}.flattening", wrapper_name.to_string_lossy()));
    std::fs::rename(first.path(), &staging).map_err(|e| fs_error("rename", &staging, &e))?;

    for child in std::fs::read_dir(&staging).map_err(|e| fs_error("read", &staging, &e))? {
        let child = child.map_err(|e| fs_error("read", &staging, &e))?;
        let target = dir.join(child.file_name());
        std::fs::rename(child.path(), &target).map_err(|e| fs_error("rename", &target, &e))?;
    }
    std::fs::remove_dir(&staging).map_err(|e| fs_error("remove", &staging, &e))?;

    tracing::debug!(
        "flattened wrapper directory '{}' in {}",
        wrapper_name.to_string_lossy(),
        dir.display()
    );
    Ok(true)
}

fn tar_error(e: std::io::Error) -> GhrabError {
    GhrabError::Other {
        message: format!("unreadable tar archive: {e}"),
    }
}

fn fs_error(operation: &str, path: &Path, e: &std::io::Error) -> GhrabError {
    GhrabError::FileSystem {
        operation: format!("{operation} ({e})"),
        path: path.display().to_string(),
    }
}
