//! Directory identity tracking so each directory is traversed once.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use dashmap::DashSet;

/// Filesystem identity of a directory.
///
/// On Unix this is the `(device, inode)` pair, which sees through symlinks
/// and bind-style aliases. Elsewhere the canonical path is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirIdentity {
    Inode { device: u64, inode: u64 },
    Path(PathBuf),
}

impl DirIdentity {
    /// Derive the identity of `path` from its (followed) metadata.
    #[cfg(unix)]
    pub fn resolve(_path: &Path, metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self::Inode {
            device: metadata.dev(),
            inode: metadata.ino(),
        }
    }

    #[cfg(not(unix))]
    pub fn resolve(path: &Path, _metadata: &Metadata) -> Self {
        Self::Path(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }
}

/// Set of directories already claimed for traversal in the current run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: DashSet<DirIdentity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Claim a directory. Returns `true` if the caller now owns it.
    ///
    /// The membership check and the insert are a single atomic operation,
    /// so two workers reaching the same directory cannot both win.
    pub fn claim(&self, identity: DirIdentity) -> bool {
        self.seen.insert(identity)
    }

    /// Number of directories claimed.
    pub fn claimed(&self) -> usize {
        self.seen.len()
    }
}
