// src/action/fileset.rs

//! Lazily-resolved sets of input files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::trace;

use crate::fs::FileSystem;

/// An ordered list of glob patterns, relative to the project root.
///
/// Nothing touches the filesystem until [`FileSet::resolve`] is called, so
/// the same set can match different files from one invocation to the next.
///
/// - `*` and `?` never match `/`; `**` spans directories.
/// - A pattern starting with `!` removes earlier matches.
/// - A leading `./` is ignored; absolute patterns are an error.
/// - Files are returned per pattern in lexicographic order, first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    patterns: Vec<String>,
}

impl FileSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| normalize_pattern(p.into()))
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Concatenate two sets, keeping pattern order.
    pub fn chain(&self, other: &FileSet) -> FileSet {
        let mut patterns = self.patterns.clone();
        patterns.extend(other.patterns.iter().cloned());
        FileSet { patterns }
    }

    /// Resolve the patterns to concrete files under `root`.
    ///
    /// Returned paths are `root.join(relative)`.
    pub fn resolve(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for raw in &self.patterns {
            if let Some(negated) = raw.strip_prefix('!') {
                let matcher = compile_glob(negated)?;
                files.retain(|path| {
                    let keep = relative_str(root, path)
                        .map(|rel| !matcher.is_match(rel.as_str()))
                        .unwrap_or(true);
                    if !keep {
                        trace!(pattern = %raw, path = %path.display(), "excluded by negated pattern");
                    }
                    keep
                });
                seen = files
                    .iter()
                    .filter_map(|p| relative_str(root, p))
                    .collect();
                continue;
            }

            let mut matched = match_pattern(fs, root, raw)?;
            matched.sort();
            trace!(pattern = %raw, count = matched.len(), "resolved glob pattern");

            for rel in matched {
                if seen.insert(rel.clone()) {
                    files.push(root.join(&rel));
                }
            }
        }

        Ok(files)
    }
}

impl<S: Into<String>> FromIterator<S> for FileSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FileSet::new(iter)
    }
}

/// `./src/*.purs` and `src/*.purs` mean the same thing.
fn normalize_pattern(pattern: String) -> String {
    let (bang, mut body) = match pattern.strip_prefix('!') {
        Some(body) => ("!", body),
        None => ("", pattern.as_str()),
    };
    while let Some(rest) = body.strip_prefix("./") {
        body = rest.trim_start_matches('/');
    }
    format!("{bang}{body}")
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    if Path::new(pattern).has_root() {
        bail!("glob pattern must be relative to the project root: {pattern}");
    }
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// Relative (forward-slash) paths under `root` matching a single pattern.
fn match_pattern(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Result<Vec<String>> {
    let matcher = compile_glob(pattern)?;
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    let literal_len = components
        .iter()
        .position(|c| has_glob_meta(c))
        .unwrap_or(components.len());

    // Fully literal pattern: a single candidate path.
    if literal_len == components.len() {
        let rel = components.join("/");
        return Ok(if fs.is_file(&root.join(&rel)) {
            vec![rel]
        } else {
            Vec::new()
        });
    }

    let start = components[..literal_len]
        .iter()
        .fold(root.to_path_buf(), |acc, c| acc.join(c));
    if !fs.is_dir(&start) {
        return Ok(Vec::new());
    }

    let mut matched = Vec::new();
    for path in fs.walk_files(&start)? {
        if let Some(rel) = relative_str(root, &path) {
            if matcher.is_match(rel.as_str()) {
                matched.push(rel);
            }
        }
    }

    Ok(matched)
}

/// `path` relative to `root`, with forward slashes.
pub(crate) fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
