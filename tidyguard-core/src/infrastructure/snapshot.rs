// tidyguard-core/src/infrastructure/snapshot.rs

use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::domain::snapshot::{FileState, Linkage, Snapshot, TrackedFile, TrackedFilePair};
use crate::error::TidyError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{
    atomic_write, ensure_symlink, linkage, overwrite_in_place, read_if_exists, remove_if_exists,
};

/// Captures the pre-check state. The descriptor is mandatory input.
pub fn capture(pair: &TrackedFilePair) -> Result<Snapshot, TidyError> {
    let snapshot = capture_current(pair)?;
    let descriptor_missing = snapshot
        .get(&pair.descriptor)
        .is_none_or(|f| f.state == FileState::Absent);
    if descriptor_missing {
        return Err(TidyError::MissingDescriptor {
            path: pair.descriptor.clone(),
        });
    }
    Ok(snapshot)
}

/// Captures whatever is on disk now; any file may be absent.
pub fn capture_current(pair: &TrackedFilePair) -> Result<Snapshot, InfrastructureError> {
    let files = pair
        .paths()
        .map(capture_file)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Snapshot::new(files))
}

fn capture_file(path: &Path) -> Result<TrackedFile, InfrastructureError> {
    let linkage = linkage(path)?;
    let (state, permissions) = match read_if_exists(path)? {
        Some((bytes, permissions)) => (FileState::Present(bytes), Some(permissions)),
        None => (FileState::Absent, None),
    };
    debug!(path = %path.display(), presence = ?state.presence(), ?linkage, "captured");
    Ok(TrackedFile {
        path: path.to_path_buf(),
        state,
        permissions,
        linkage,
    })
}

/// Puts every file back the way `original` saw it.
///
/// All files are attempted; the first failure is returned.
pub fn restore(original: &Snapshot) -> Result<(), InfrastructureError> {
    let mut first_error = None;
    for file in original.files() {
        if let Err(e) = restore_file(file) {
            warn!(path = %file.path.display(), error = %e, "restore step failed");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Writes through links so the file they share gets its bytes back too.
fn restore_file(file: &TrackedFile) -> Result<(), InfrastructureError> {
    let permissions = file.permissions.as_ref();
    if let Linkage::Symlink(target) = &file.linkage {
        ensure_symlink(&file.path, target)?;
        return match &file.state {
            FileState::Present(bytes) => overwrite_in_place(&file.path, bytes, permissions),
            // Dangling at capture time: drop whatever the tool created behind it
            FileState::Absent => remove_if_exists(&link_destination(&file.path, target)),
        };
    }
    match &file.state {
        FileState::Absent => remove_if_exists(&file.path),
        FileState::Present(bytes) if file.linkage.is_shared() => {
            overwrite_in_place(&file.path, bytes, permissions)
        }
        FileState::Present(bytes) => atomic_write(&file.path, bytes, permissions),
    }
}

fn link_destination(link: &Path, target: &Path) -> PathBuf {
    match link.parent() {
        Some(parent) => parent.join(target),
        None => target.to_path_buf(),
    }
}

/// Rollback scope armed right after the first capture.
///
/// Call [`RestoreGuard::restore`] on every normal path to observe the
/// result. If the guard is dropped while still armed (panic, cancelled
/// future) it restores anyway and logs any failure.
#[must_use = "dropping the guard restores immediately"]
pub struct RestoreGuard<'a> {
    original: &'a Snapshot,
    armed: bool,
}

impl<'a> RestoreGuard<'a> {
    pub fn arm(original: &'a Snapshot) -> Self {
        Self {
            original,
            armed: true,
        }
    }

    pub fn restore(mut self) -> Result<(), InfrastructureError> {
        self.armed = false;
        restore(self.original)
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = restore(self.original) {
            error!(error = %e, "rollback on unwind failed; tracked files may be modified");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn pair(dir: &Path) -> TrackedFilePair {
        TrackedFilePair::resolve(dir, "go.mod", Some("go.sum"))
    }

    #[test]
    fn test_capture_requires_descriptor() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.sum"), "h1\n")?;

        let err = capture(&pair(dir.path())).err();
        assert!(matches!(err, Some(TidyError::MissingDescriptor { .. })));
        Ok(())
    }

    #[test]
    fn test_capture_records_missing_lock_as_absent() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.mod"), "module m\n")?;

        let snapshot = capture(&pair(dir.path()))?;
        let lock = snapshot.get(&dir.path().join("go.sum"));
        assert_eq!(lock.map(|f| &f.state), Some(&FileState::Absent));
        Ok(())
    }

    #[test]
    fn test_restore_removes_files_created_after_capture() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.mod"), "module m\n")?;
        let snapshot = capture(&pair(dir.path()))?;

        fs::write(dir.path().join("go.sum"), "h1\n")?;
        fs::write(dir.path().join("go.mod"), "module m\n\ngo 1.22\n")?;
        restore(&snapshot)?;

        assert!(!dir.path().join("go.sum").exists());
        assert_eq!(fs::read_to_string(dir.path().join("go.mod"))?, "module m\n");
        Ok(())
    }

    #[test]
    fn test_restore_keeps_present_empty_file() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.mod"), "module m\n")?;
        fs::write(dir.path().join("go.sum"), "")?;
        let snapshot = capture(&pair(dir.path()))?;

        fs::remove_file(dir.path().join("go.sum"))?;
        restore(&snapshot)?;

        assert_eq!(fs::read(dir.path().join("go.sum"))?, Vec::<u8>::new());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_writes_back_through_symlinked_descriptor() -> Result<()> {
        let root = tempdir()?;
        let module = root.path().join("svc");
        fs::create_dir(&module)?;
        fs::write(root.path().join("shared.mod"), "module original\n")?;
        std::os::unix::fs::symlink("../shared.mod", module.join("go.mod"))?;
        let snapshot = capture(&pair(&module))?;

        // Written through the link, then the link itself replaced
        fs::write(module.join("go.mod"), "module tidied\n")?;
        fs::remove_file(module.join("go.mod"))?;
        fs::write(module.join("go.mod"), "module replaced\n")?;
        restore(&snapshot)?;

        assert!(fs::symlink_metadata(module.join("go.mod"))?.file_type().is_symlink());
        assert_eq!(fs::read_link(module.join("go.mod"))?, Path::new("../shared.mod"));
        assert_eq!(
            fs::read_to_string(root.path().join("shared.mod"))?,
            "module original\n"
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_keeps_hard_linked_lock_shared() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.mod"), "module m\n")?;
        fs::write(dir.path().join("go.sum"), "h1 original\n")?;
        fs::hard_link(dir.path().join("go.sum"), dir.path().join("other.sum"))?;
        let snapshot = capture(&pair(dir.path()))?;

        fs::write(dir.path().join("go.sum"), "h1 tidied\n")?;
        restore(&snapshot)?;

        assert_eq!(fs::read_to_string(dir.path().join("other.sum"))?, "h1 original\n");
        assert_eq!(fs::read_to_string(dir.path().join("go.sum"))?, "h1 original\n");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_clears_file_created_behind_dangling_link() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.mod"), "module m\n")?;
        std::os::unix::fs::symlink("cache/go.sum", dir.path().join("go.sum"))?;
        fs::create_dir(dir.path().join("cache"))?;
        let snapshot = capture(&pair(dir.path()))?;

        fs::write(dir.path().join("go.sum"), "h1\n")?;
        restore(&snapshot)?;

        assert!(!dir.path().join("cache/go.sum").exists());
        assert_eq!(fs::read_link(dir.path().join("go.sum"))?, Path::new("cache/go.sum"));
        Ok(())
    }

    #[test]
    fn test_dropped_guard_restores() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("go.mod"), "module m\n")?;
        let snapshot = capture(&pair(dir.path()))?;

        {
            let _guard = RestoreGuard::arm(&snapshot);
            fs::write(dir.path().join("go.mod"), "changed\n")?;
        }

        assert_eq!(fs::read_to_string(dir.path().join("go.mod"))?, "module m\n");
        Ok(())
    }
}
