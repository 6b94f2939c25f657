// src/action/toolchain.rs

//! Actions delegating to the external compiler toolchain.
//!
//! None of these interpret tool diagnostics: a tool either exits with code 0
//! or the action fails with its status and trailing output.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::{ActionContext, ActionError, FileSet};

/// Compile sources (plus their foreign files) into an output directory.
///
/// Invocation: `<compiler> <args..> <sources..> --ffi <file>.. --output <dir>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileAction {
    pub sources: FileSet,
    /// Foreign files may legitimately match nothing.
    pub foreigns: FileSet,
    pub output_dir: PathBuf,
}

impl CompileAction {
    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        let sources = ctx.resolve_inputs(&self.sources)?;
        let foreigns = self.foreigns.resolve(ctx.fs.as_ref(), &ctx.root)?;

        info!(
            sources = sources.len(),
            foreigns = foreigns.len(),
            output = %self.output_dir.display(),
            "compiling"
        );

        let mut invocation = ctx
            .invocation(&ctx.tools.compiler)
            .args(sources.iter().map(|p| ctx.tool_arg(p)));
        for foreign in &foreigns {
            invocation = invocation.arg("--ffi").arg(ctx.tool_arg(foreign));
        }
        let invocation = invocation
            .arg("--output")
            .arg(ctx.tool_arg(&self.output_dir));

        ctx.run_tool(invocation).await
    }
}

/// Bundle compiled modules into one file with a designated entry module.
///
/// Invocation: `<bundler> <args..> <files..> --module <main> --main <main> --output <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleAction {
    pub artifacts: FileSet,
    pub main: String,
    pub output: PathBuf,
}

impl BundleAction {
    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        let files = ctx.resolve_inputs(&self.artifacts)?;

        info!(
            files = files.len(),
            main = %self.main,
            output = %self.output.display(),
            "bundling"
        );

        let invocation = ctx
            .invocation(&ctx.tools.bundler)
            .args(files.iter().map(|p| ctx.tool_arg(p)))
            .arg("--module")
            .arg(&self.main)
            .arg("--main")
            .arg(&self.main)
            .arg("--output")
            .arg(ctx.tool_arg(&self.output));

        ctx.run_tool(invocation).await
    }
}

/// Syntax-check every matched artifact, one tool run per file.
///
/// All files are checked even after a failure so the report is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateAction {
    pub artifacts: FileSet,
}

impl ValidateAction {
    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        let files = ctx.resolve_inputs(&self.artifacts)?;
        if files.is_empty() {
            debug!("no files to validate");
            return Ok(());
        }

        let mut failures = Vec::new();
        for file in &files {
            let arg = ctx.tool_arg(file);
            let invocation = ctx.invocation(&ctx.tools.validator).arg(&arg);
            if let Err(err) = ctx.run_tool(invocation).await {
                warn!(file = %arg, error = %err, "validation failed");
                failures.push(format!("{arg}: {err:#}"));
            }
        }

        if failures.is_empty() {
            info!(files = files.len(), "all files passed validation");
            Ok(())
        } else {
            Err(ActionError::ValidationFailed {
                failures,
                total: files.len(),
            }
            .into())
        }
    }
}

/// Package a single artifact into a distributable file.
///
/// Invocation: `<packager> <args..> --entry <input> --output-path <dest>
/// --output-filename <filename> --resolve-modules <dir>..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageAction {
    pub input: PathBuf,
    pub filename: String,
    pub dest: PathBuf,
    pub modules_directories: Vec<String>,
}

impl PackageAction {
    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        let input = ctx.resolve(&self.input);
        if !ctx.fs.is_file(&input) {
            return Err(ActionError::MissingInput(self.input.clone()).into());
        }

        info!(
            input = %self.input.display(),
            output = %self.dest.join(&self.filename).display(),
            "packaging"
        );

        let mut invocation = ctx
            .invocation(&ctx.tools.packager)
            .arg("--entry")
            .arg(entry_arg(&ctx.tool_arg(&self.input)))
            .arg("--output-path")
            .arg(ctx.tool_arg(&self.dest))
            .arg("--output-filename")
            .arg(&self.filename);
        for dir in &self.modules_directories {
            invocation = invocation.arg("--resolve-modules").arg(dir);
        }

        ctx.run_tool(invocation).await
    }
}

/// Bare relative names would be looked up as packages; make them explicit
/// relative paths.
fn entry_arg(path: &str) -> String {
    if Path::new(path).is_absolute() || path.starts_with("./") || path.starts_with("../") {
        path.to_string()
    } else {
        format!("./{path}")
    }
}
