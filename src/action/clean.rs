// src/action/clean.rs

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{ActionContext, ActionError};

/// Delete a directory tree. A missing directory counts as already clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanAction {
    pub dir: PathBuf,
}

impl CleanAction {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        if !is_below_root(&self.dir) {
            return Err(ActionError::UnsafeCleanTarget(self.dir.clone()).into());
        }
        let target = ctx.resolve(&self.dir);
        let fs = Arc::clone(&ctx.fs);
        let path = target.clone();

        let removed = tokio::task::spawn_blocking(move || fs.remove_dir_all(&path))
            .await
            .context("joining directory removal")?;

        match removed {
            Ok(()) => {
                info!(dir = %target.display(), "removed directory tree");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %target.display(), "directory does not exist; nothing to clean");
                Ok(())
            }
            Err(err) => {
                Err(err).with_context(|| format!("removing {}", target.display()))
            }
        }
    }
}

/// Whether `path`, joined onto a root, names something strictly inside it:
/// relative, no `..`, and at least one real component.
pub fn is_below_root(path: &Path) -> bool {
    let mut named = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    named
}
