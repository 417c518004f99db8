// Path: psi-core/src/install/extract.rs
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use psi_common::error::{PsiError, Result};
use tar::Archive;
use tracing::{debug, error, warn};
use xz2::read::XzDecoder;

use super::first_dir_matching;

const SOURCE_DIR_PREFIX: &str = "pysvn-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Gzip,
    Bzip2,
    Xz,
    Tar,
}

/// Identifies the compression of a tarball from its magic bytes, falling back
/// to the file name when the content is not recognised.
pub fn detect_archive_kind(archive_path: &Path) -> Result<ArchiveKind> {
    let sniffed = infer::get_from_path(archive_path).map_err(|e| {
        PsiError::Io(Arc::new(std::io::Error::new(
            e.kind(),
            format!("Failed to open archive {}: {}", archive_path.display(), e),
        )))
    })?;

    if let Some(kind) = sniffed {
        debug!(
            "Detected archive content type {} for {}",
            kind.mime_type(),
            archive_path.display()
        );
        match kind.mime_type() {
            "application/gzip" => return Ok(ArchiveKind::Gzip),
            "application/x-bzip2" => return Ok(ArchiveKind::Bzip2),
            "application/x-xz" => return Ok(ArchiveKind::Xz),
            "application/x-tar" => return Ok(ArchiveKind::Tar),
            _ => {}
        }
    }

    let name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Ok(ArchiveKind::Gzip)
    } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") || name.ends_with(".tbz") {
        Ok(ArchiveKind::Bzip2)
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        Ok(ArchiveKind::Xz)
    } else if name.ends_with(".tar") {
        Ok(ArchiveKind::Tar)
    } else {
        Err(PsiError::Extract(format!(
            "Unsupported archive format for {}",
            archive_path.display()
        )))
    }
}

fn open_archive(archive_path: &Path, kind: ArchiveKind) -> Result<Archive<Box<dyn Read>>> {
    let file = File::open(archive_path).map_err(|e| {
        PsiError::Io(Arc::new(std::io::Error::new(
            e.kind(),
            format!("Failed to open archive {}: {}", archive_path.display(), e),
        )))
    })?;
    let reader: Box<dyn Read> = match kind {
        ArchiveKind::Gzip => Box::new(GzDecoder::new(file)),
        ArchiveKind::Bzip2 => Box::new(BzDecoder::new(file)),
        ArchiveKind::Xz => Box::new(XzDecoder::new(file)),
        ArchiveKind::Tar => Box::new(file),
    };
    Ok(Archive::new(reader))
}

/// Joins an archive entry path onto `target_dir`, resolving `.` and `..`
/// lexically. Returns `None` when the result would land outside `target_dir`.
pub fn resolve_entry_path(target_dir: &Path, entry_path: &Path) -> Option<PathBuf> {
    let mut resolved = target_dir.to_path_buf();
    let mut depth = 0usize;
    for comp in entry_path.components() {
        match comp {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Checks every entry of the archive without writing anything.
///
/// Returns the number of entries inspected.
pub fn validate_archive_entries(
    archive_path: &Path,
    kind: ArchiveKind,
    target_dir: &Path,
) -> Result<usize> {
    let mut archive = open_archive(archive_path, kind)?;
    let mut count = 0usize;

    for entry_result in archive.entries()? {
        let entry = entry_result.map_err(|e| {
            PsiError::Extract(format!(
                "Error reading TAR entry from {}: {}",
                archive_path.display(),
                e
            ))
        })?;
        let path_in_archive = entry
            .path()
            .map_err(|e| {
                PsiError::Extract(format!(
                    "Invalid path in TAR entry from {}: {}",
                    archive_path.display(),
                    e
                ))
            })?
            .into_owned();

        if resolve_entry_path(target_dir, &path_in_archive).is_none() {
            error!(
                "Path traversal detected for entry {} in {}",
                path_in_archive.display(),
                archive_path.display()
            );
            return Err(PsiError::ArchiveTraversal {
                archive: archive_path.display().to_string(),
                entry: path_in_archive.display().to_string(),
            });
        }
        count += 1;
    }

    debug!(
        "Validated {} entries in {}",
        count,
        archive_path.display()
    );
    Ok(count)
}

/// Extracts a source tarball into `target_dir`.
///
/// All entries are validated first, so an archive containing a single escaping
/// entry leaves `target_dir` untouched.
pub fn extract_archive(archive_path: &Path, target_dir: &Path) -> Result<()> {
    let kind = detect_archive_kind(archive_path)?;
    debug!(
        "Extracting archive '{}' (type: {:?}) to '{}'",
        archive_path.display(),
        kind,
        target_dir.display()
    );

    fs::create_dir_all(target_dir).map_err(|e| {
        PsiError::Io(Arc::new(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create target directory {}: {}",
                target_dir.display(),
                e
            ),
        )))
    })?;

    validate_archive_entries(archive_path, kind, target_dir)?;

    let mut archive = open_archive(archive_path, kind)?;
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    for entry_result in archive.entries()? {
        let mut entry = entry_result.map_err(|e| {
            PsiError::Extract(format!(
                "Error reading TAR entry from {}: {}",
                archive_path.display(),
                e
            ))
        })?;
        let path_in_archive = entry
            .path()
            .map(|p| p.into_owned())
            .unwrap_or_default();

        match entry.unpack_in(target_dir) {
            Ok(true) => debug!("Unpacked TAR entry {}", path_in_archive.display()),
            Ok(false) => warn!(
                "Skipped TAR entry {} (not representable inside {})",
                path_in_archive.display(),
                target_dir.display()
            ),
            Err(e) => {
                error!(
                    "Failed to unpack entry {} from {}: {}",
                    path_in_archive.display(),
                    archive_path.display(),
                    e
                );
                return Err(PsiError::Extract(format!(
                    "Failed to unpack {} from {}: {}",
                    path_in_archive.display(),
                    archive_path.display(),
                    e
                )));
            }
        }
    }

    debug!("Finished TAR extraction for {}", archive_path.display());
    Ok(())
}

/// Locates the top-level `pysvn-*` directory of an extracted source tarball.
pub fn find_source_root(target_dir: &Path) -> Result<PathBuf> {
    first_dir_matching(target_dir, SOURCE_DIR_PREFIX)?.ok_or_else(|| {
        PsiError::MissingContent("Unable to find pysvn-* directory in tarball.".to_string())
    })
}
