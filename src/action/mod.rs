// src/action/mod.rs

//! The work a task performs.
//!
//! - [`fileset`] resolves glob patterns to files at execution time.
//! - [`clean`] deletes the output tree.
//! - [`toolchain`] drives the external compiler, bundler, validator and
//!   packager.
//! - [`shell`] runs an arbitrary command line.
//!
//! Every action reports an explicit `anyhow::Result<()>`; the executor turns
//! that into a `TaskOutcome` for the scheduler.

pub mod clean;
pub mod fileset;
pub mod shell;
pub mod toolchain;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::{ToolConfig, ToolsSection};
use crate::exec::tool::{ToolInvocation, ToolRunner};
use crate::fs::FileSystem;
use crate::types::EmptyGlobPolicy;

pub use clean::CleanAction;
pub use fileset::FileSet;
pub use shell::ShellAction;
pub use toolchain::{BundleAction, CompileAction, PackageAction, ValidateAction};

/// Typed action failures callers may want to match on (via
/// `anyhow::Error::downcast_ref`).
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("no input files matched {}", .patterns.join(", "))]
    NoInputFiles { patterns: Vec<String> },

    #[error("'{command}' failed with {status}{}", format_output(.output))]
    ToolFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("{} of {total} file(s) failed validation: {}", .failures.len(), .failures.join("; "))]
    ValidationFailed { failures: Vec<String>, total: usize },

    #[error("input artifact {} does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("refusing to remove {}: not a directory below the project root", .0.display())]
    UnsafeCleanTarget(PathBuf),
}

fn format_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{output}")
    }
}

/// Number of output lines attached to a tool failure.
const FAILURE_OUTPUT_LINES: usize = 20;

/// Everything an action needs from its environment.
#[derive(Clone)]
pub struct ActionContext {
    /// Project root; relative paths and globs are resolved against it and
    /// tools run with it as working directory.
    pub root: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    pub runner: Arc<dyn ToolRunner>,
    pub tools: ToolsSection,
    pub empty_globs: EmptyGlobPolicy,
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("root", &self.root)
            .field("empty_globs", &self.empty_globs)
            .finish_non_exhaustive()
    }
}

impl ActionContext {
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            root: root.into(),
            fs,
            runner,
            tools: ToolsSection::default(),
            empty_globs: EmptyGlobPolicy::default(),
        }
    }

    pub fn with_tools(mut self, tools: ToolsSection) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_empty_globs(mut self, policy: EmptyGlobPolicy) -> Self {
        self.empty_globs = policy;
        self
    }

    /// Path as seen by the filesystem.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Path as passed to a tool running in `root`.
    pub fn tool_arg(&self, path: &Path) -> String {
        match fileset::relative_str(&self.root, path) {
            Some(rel) => rel,
            None => path.to_string_lossy().replace('\\', "/"),
        }
    }

    /// Start an invocation of `tool` in the project root.
    pub fn invocation(&self, tool: &ToolConfig) -> ToolInvocation {
        ToolInvocation::new(&tool.program, &self.root).args(tool.args.iter().cloned())
    }

    /// Resolve a file set and apply the empty-glob policy.
    pub(crate) fn resolve_inputs(&self, set: &FileSet) -> Result<Vec<PathBuf>> {
        let files = set.resolve(self.fs.as_ref(), &self.root)?;
        if files.is_empty() && self.empty_globs == EmptyGlobPolicy::Error {
            return Err(ActionError::NoInputFiles {
                patterns: set.patterns().to_vec(),
            }
            .into());
        }
        Ok(files)
    }

    /// Run a tool and turn a non-zero exit into an [`ActionError::ToolFailed`].
    pub(crate) async fn run_tool(&self, invocation: ToolInvocation) -> Result<()> {
        let command = invocation.command_line();
        let output = self
            .runner
            .invoke(invocation)
            .await
            .with_context(|| format!("running '{command}'"))?;

        if output.is_success() {
            Ok(())
        } else {
            Err(ActionError::ToolFailed {
                command,
                status: output.status_text(),
                output: output.tail(FAILURE_OUTPUT_LINES),
            }
            .into())
        }
    }
}

/// The concrete operation behind a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Clean(CleanAction),
    Compile(CompileAction),
    Bundle(BundleAction),
    Validate(ValidateAction),
    Package(PackageAction),
    Shell(ShellAction),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Clean(_) => "clean",
            Action::Compile(_) => "compile",
            Action::Bundle(_) => "bundle",
            Action::Validate(_) => "validate",
            Action::Package(_) => "package",
            Action::Shell(_) => "shell",
        }
    }

    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        match self {
            Action::Clean(a) => a.execute(ctx).await,
            Action::Compile(a) => a.execute(ctx).await,
            Action::Bundle(a) => a.execute(ctx).await,
            Action::Validate(a) => a.execute(ctx).await,
            Action::Package(a) => a.execute(ctx).await,
            Action::Shell(a) => a.execute(ctx).await,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Clean(a) => write!(f, "clean {}", a.dir.display()),
            Action::Compile(a) => write!(
                f,
                "compile [{}] ffi [{}] -> {}",
                a.sources.patterns().join(", "),
                a.foreigns.patterns().join(", "),
                a.output_dir.display()
            ),
            Action::Bundle(a) => write!(
                f,
                "bundle [{}] main {} -> {}",
                a.artifacts.patterns().join(", "),
                a.main,
                a.output.display()
            ),
            Action::Validate(a) => {
                write!(f, "validate [{}]", a.artifacts.patterns().join(", "))
            }
            Action::Package(a) => write!(
                f,
                "package {} -> {}",
                a.input.display(),
                a.dest.join(&a.filename).display()
            ),
            Action::Shell(a) => write!(f, "shell `{}`", a.cmd),
        }
    }
}
