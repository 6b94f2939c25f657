// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

pub mod mock;

/// Abstract filesystem interface used by glob resolution and the
/// filesystem-mutating actions.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Every regular file below `dir`, as `dir.join(relative)`.
    ///
    /// Directory symlinks are followed, but a link back to one of its own
    /// ancestors is not descended into again.
    fn walk_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Recursively delete a directory tree.
    ///
    /// Returns the raw `io::Error` so callers can tell `NotFound` apart from
    /// real failures.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.loop_ancestor().is_some() => {
                    debug!(path = ?err.path(), "symlink loop; not descending again");
                    continue;
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("walking {}", dir.display()));
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}
