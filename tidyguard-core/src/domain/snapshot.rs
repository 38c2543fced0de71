// tidyguard-core/src/domain/snapshot.rs

use std::fs::Permissions;
use std::path::{Path, PathBuf};

/// The two files observed during one verification transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFilePair {
    pub descriptor: PathBuf,
    pub lock: Option<PathBuf>,
}

impl TrackedFilePair {
    /// Resolves the configured file names against a module directory.
    pub fn resolve(module_dir: &Path, descriptor: &str, lock: Option<&str>) -> Self {
        Self {
            descriptor: module_dir.join(descriptor),
            lock: lock.map(|name| module_dir.join(name)),
        }
    }

    /// Descriptor first, then the lock file when one is tracked.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.descriptor.as_path()).chain(self.lock.as_deref())
    }
}

/// Three-valued presence marker of a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Bytes,
    Empty,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Absent,
    Present(Vec<u8>),
}

impl FileState {
    pub fn presence(&self) -> Presence {
        match self {
            FileState::Absent => Presence::Absent,
            FileState::Present(bytes) if bytes.is_empty() => Presence::Empty,
            FileState::Present(_) => Presence::Bytes,
        }
    }

    /// Raw bytes; an absent file reads as an empty buffer.
    pub fn bytes(&self) -> &[u8] {
        match self {
            FileState::Absent => &[],
            FileState::Present(bytes) => bytes,
        }
    }
}

/// How a tracked path is tied to the bytes behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Linkage {
    /// Regular file owned by this path alone.
    #[default]
    Plain,
    /// The path is a symlink holding this target, relative to its parent.
    Symlink(PathBuf),
    /// Regular file whose inode has other names.
    HardLinked,
}

impl Linkage {
    /// Whether a restore must rewrite the existing inode instead of replacing it.
    pub fn is_shared(&self) -> bool {
        !matches!(self, Linkage::Plain)
    }
}

/// One captured file. Permissions and linkage ride along so a restore puts
/// back the same kind of file, but they take no part in equality.
#[derive(Debug, Clone)]
pub struct TrackedFile {
    pub path: PathBuf,
    pub state: FileState,
    pub permissions: Option<Permissions>,
    pub linkage: Linkage,
}

impl PartialEq for TrackedFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.state == other.state
    }
}

impl Eq for TrackedFile {}

/// Immutable capture of a [`TrackedFilePair`] at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    files: Vec<TrackedFile>,
}

impl Snapshot {
    pub fn new(files: Vec<TrackedFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn get(&self, path: &Path) -> Option<&TrackedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Pairs up entries of two snapshots of the same [`TrackedFilePair`] that differ.
    pub fn changed_against<'a>(
        &'a self,
        after: &'a Snapshot,
    ) -> impl Iterator<Item = (&'a TrackedFile, &'a TrackedFile)> {
        self.files.iter().filter_map(move |before| {
            after
                .get(&before.path)
                .filter(|current| current.state != before.state)
                .map(|current| (before, current))
        })
    }
}
