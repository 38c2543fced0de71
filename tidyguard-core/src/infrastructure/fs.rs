// tidyguard-core/src/infrastructure/fs.rs

use std::fs::{self, OpenOptions, Permissions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::domain::snapshot::Linkage;
use crate::infrastructure::error::InfrastructureError;

/// Write content to a file atomically using a temporary file.
///
/// This function:
/// 1. Creates a temporary file in the same directory as the target path.
/// 2. Writes the content and applies `permissions`, when given.
/// 3. Persists (renames) the temporary file to the target path.
///
/// The target is either fully written or left untouched.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
    permissions: Option<&Permissions>,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let write_err = |source| InfrastructureError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // Same directory, so the rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;

    temp_file.write_all(content.as_ref()).map_err(write_err)?;

    if let Some(permissions) = permissions {
        temp_file
            .as_file()
            .set_permissions(permissions.clone())
            .map_err(write_err)?;
    }

    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Rewrites the file `path` resolves to without replacing its inode.
///
/// Symlinks are followed and other hard links see the new bytes. The
/// file is created when missing.
pub fn overwrite_in_place<C: AsRef<[u8]>>(
    path: &Path,
    content: C,
    permissions: Option<&Permissions>,
) -> Result<(), InfrastructureError> {
    let write_err = |source| InfrastructureError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(content.as_ref()).map_err(write_err)?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions.clone()).map_err(write_err)?;
    }
    file.sync_all().map_err(write_err)?;
    Ok(())
}

/// Inspects `path` itself, without following a symlink.
pub fn linkage(path: &Path) -> Result<Linkage, InfrastructureError> {
    let read_err = |source| InfrastructureError::Read {
        path: path.to_path_buf(),
        source,
    };
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Linkage::Plain),
        Err(e) => return Err(read_err(e)),
    };
    if metadata.file_type().is_symlink() {
        return Ok(Linkage::Symlink(fs::read_link(path).map_err(read_err)?));
    }
    if has_other_names(&metadata) {
        return Ok(Linkage::HardLinked);
    }
    Ok(Linkage::Plain)
}

#[cfg(unix)]
fn has_other_names(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    metadata.is_file() && metadata.nlink() > 1
}

#[cfg(not(unix))]
fn has_other_names(_metadata: &fs::Metadata) -> bool {
    false
}

/// Makes `path` a symlink to `target`, replacing whatever sits there.
pub fn ensure_symlink(path: &Path, target: &Path) -> Result<(), InfrastructureError> {
    if fs::read_link(path).is_ok_and(|current| current == target) {
        return Ok(());
    }
    remove_if_exists(path)?;
    symlink(target, path).map_err(|source| InfrastructureError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn symlink(target: &Path, path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, path)
}

#[cfg(windows)]
fn symlink(target: &Path, path: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, path)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _path: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

/// Reads a file, mapping "not found" to `None`.
pub fn read_if_exists(path: &Path) -> Result<Option<(Vec<u8>, Permissions)>, InfrastructureError> {
    let read_err = |source| InfrastructureError::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(read_err(e)),
    };
    let permissions = fs::metadata(path).map_err(read_err)?.permissions();
    Ok(Some((bytes, permissions)))
}

/// Deletes a file; a missing file is not an error.
pub fn remove_if_exists(path: &Path) -> Result<(), InfrastructureError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(InfrastructureError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
