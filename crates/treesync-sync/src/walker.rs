//! Directory listing and task creation for the tree walk

use crate::filter::ExclusionFilter;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};
use treesync_types::{Error, Result};

/// Type tag of a directory entry, symlinks not followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Socket, FIFO or device node
    Other,
}

impl EntryKind {
    /// Classify a file type
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// One entry of a source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Bare file name
    pub name: OsString,
    /// Entry type
    pub kind: EntryKind,
    /// Path relative to the source root
    pub relative_path: PathBuf,
}

/// One unit of scheduled work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    /// Entry in the source tree
    pub source: PathBuf,
    /// Mirrored path in the destination tree
    pub destination: PathBuf,
    /// Path relative to the source root
    pub relative_path: PathBuf,
    /// Entry type
    pub kind: EntryKind,
}

impl SyncTask {
    /// Task for the root directory of a run
    pub fn root<P: Into<PathBuf>, Q: Into<PathBuf>>(source: P, destination: Q) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            relative_path: PathBuf::new(),
            kind: EntryKind::Directory,
        }
    }
}

/// Tasks created for one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// One task per non-excluded entry
    pub tasks: Vec<SyncTask>,
    /// Entries dropped by the exclusion filter
    pub excluded: u64,
}

/// Walks one directory level at a time
///
/// The walker itself does not recurse: each directory task hands its child
/// tasks back to the engine, which schedules them. Tree depth is therefore
/// not limited by the call stack.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root_source: PathBuf,
    filter: ExclusionFilter,
}

impl TreeWalker {
    /// Create a walker for the tree rooted at `root_source`
    pub fn new<P: Into<PathBuf>>(root_source: P, filter: ExclusionFilter) -> Self {
        Self {
            root_source: root_source.into(),
            filter,
        }
    }

    /// Source root of the walk
    pub fn root(&self) -> &Path {
        &self.root_source
    }

    /// Ensure `dest_dir` exists, then create a task for every non-excluded
    /// entry of `source_dir`
    ///
    /// The destination directory always exists before any task for its
    /// children is returned.
    pub async fn walk(&self, source_dir: &Path, dest_dir: &Path) -> Result<DirectoryListing> {
        Self::ensure_directory(dest_dir).await?;

        let mut listing = DirectoryListing::default();
        for entry in self.list_entries(source_dir).await? {
            let name = entry.name.to_string_lossy();
            let relative = entry.relative_path.to_string_lossy();
            if let Some(pattern) = self.filter.matching_pattern(&name, &relative) {
                debug!("Excluded '{}' (matches '{}')", relative, pattern);
                listing.excluded += 1;
                continue;
            }

            listing.tasks.push(SyncTask {
                source: source_dir.join(&entry.name),
                destination: dest_dir.join(&entry.name),
                relative_path: entry.relative_path,
                kind: entry.kind,
            });
        }

        trace!(
            "Walked '{}': {} task(s), {} excluded",
            source_dir.display(),
            listing.tasks.len(),
            listing.excluded
        );
        Ok(listing)
    }

    /// Create a directory and all missing parents
    pub async fn ensure_directory(path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| Error::DirectoryCreation {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// List the immediate entries of a source directory
    pub async fn list_entries(&self, source_dir: &Path) -> Result<Vec<DirEntry>> {
        let read_dir_error = |e: std::io::Error| Error::ReadDirectory {
            path: source_dir.to_path_buf(),
            message: e.to_string(),
        };

        let mut entries = fs::read_dir(source_dir).await.map_err(read_dir_error)?;
        let mut listed = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| Error::Metadata {
                path: path.clone(),
                message: e.to_string(),
            })?;

            listed.push(DirEntry {
                name: entry.file_name(),
                kind: EntryKind::from_file_type(file_type),
                relative_path: self.relative_path(&path),
            });
        }

        Ok(listed)
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root_source)
            .unwrap_or(path)
            .to_path_buf()
    }
}
