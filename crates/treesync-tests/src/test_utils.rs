//! Unified test utilities for treesync tests and benchmarks
//!
//! A [`TreeFixture`] owns a scratch directory with a `source` and a
//! `destination` root and builds source trees with exact sizes and
//! modification times.

use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Generate deterministic file content of the given size
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect()
}

/// Scratch source and destination trees
#[derive(Debug)]
pub struct TreeFixture {
    temp_dir: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

impl TreeFixture {
    /// Create an empty source root; the destination root is not created
    pub fn new() -> io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("source");
        let destination = temp_dir.path().join("destination");
        fs::create_dir_all(&source)?;
        Ok(Self {
            temp_dir,
            source,
            destination,
        })
    }

    /// Scratch directory holding both roots
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Source root
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination root
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path of `relative` under the source root
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source.join(relative)
    }

    /// Path of `relative` under the destination root
    pub fn destination_path(&self, relative: &str) -> PathBuf {
        self.destination.join(relative)
    }

    /// Write a source file of `size` bytes with its mtime pinned to `mtime`
    /// seconds after the epoch, creating parent directories
    pub fn write_file(&self, relative: &str, size: usize, mtime: i64) -> io::Result<PathBuf> {
        let path = self.source_path(relative);
        write_with_mtime(&path, &generate_test_data(size), mtime)?;
        Ok(path)
    }

    /// Write a destination file, as left behind by an earlier run
    pub fn write_destination_file(
        &self,
        relative: &str,
        contents: &[u8],
        mtime: i64,
    ) -> io::Result<PathBuf> {
        let path = self.destination_path(relative);
        write_with_mtime(&path, contents, mtime)?;
        Ok(path)
    }

    /// Create a source directory and its parents
    pub fn create_dir(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.source_path(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Create a source symlink pointing at the literal `target`
    #[cfg(unix)]
    pub fn symlink(&self, relative: &str, target: &str) -> io::Result<PathBuf> {
        let path = self.source_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }

    /// Pin the mtime of a source entry
    pub fn set_source_mtime(&self, relative: &str, mtime: i64) -> io::Result<()> {
        set_file_mtime(self.source_path(relative), FileTime::from_unix_time(mtime, 0))
    }

    /// Build `count` files of `size` bytes spread over `dirs` directories
    pub fn populate_wide(&self, dirs: usize, count: usize, size: usize) -> io::Result<()> {
        for i in 0..count {
            let relative = format!("dir{}/file{}.dat", i % dirs.max(1), i);
            self.write_file(&relative, size, 1_000)?;
        }
        Ok(())
    }
}

fn write_with_mtime(path: &Path, contents: &[u8], mtime: i64) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0))
}

/// Size of a file, following symlinks
pub fn file_size(path: &Path) -> io::Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Every regular file under `root`, as sorted root-relative paths
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_test_data() {
        let data = generate_test_data(1024);
        assert_eq!(data.len(), 1024);
        assert_eq!(data[0], 13);
    }

    #[test]
    fn test_fixture_pins_size_and_mtime() {
        let fixture = TreeFixture::new().unwrap();
        let path = fixture.write_file("nested/a.txt", 100, 100).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), 100);
        assert_eq!(
            FileTime::from_last_modification_time(&metadata),
            FileTime::from_unix_time(100, 0)
        );
        assert!(!fixture.destination().exists());
    }

    #[test]
    fn test_list_files() {
        let fixture = TreeFixture::new().unwrap();
        fixture.populate_wide(2, 4, 8).unwrap();

        let files = list_files(fixture.source()).unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(files[0], Path::new("dir0").join("file0.dat"));
    }
}
