// src/pipeline.rs

//! The build pipeline: built-in tasks plus tasks declared in the config file.
//!
//! | Task             | Prerequisites              | Action                                   |
//! |------------------|----------------------------|------------------------------------------|
//! | `clean`          |                            | remove `output_dir`                      |
//! | `make`           |                            | compile library sources                  |
//! | `example-make`   |                            | compile library + example sources        |
//! | `example-bundle` | `example-make`             | bundle `output_dir/**/*.js` from `Main`  |
//! | `example`        | `example-bundle`           | package the bundle into `example/`       |
//! | `jsvalidate`     | `make`                     | syntax-check `output_dir/**/*.js`        |
//! | `default`        | `jsvalidate`, `example`    | none                                     |

use std::path::PathBuf;

use tracing::debug;

use crate::action::{
    Action, BundleAction, CleanAction, CompileAction, FileSet, PackageAction, ShellAction,
    ValidateAction,
};
use crate::config::{ActionConfig, ConfigFile, PipelineSection};
use crate::dag::{TaskGraph, TaskGraphBuilder};
use crate::errors::Result;

pub const CLEAN: &str = "clean";
pub const MAKE: &str = "make";
pub const EXAMPLE_MAKE: &str = "example-make";
pub const EXAMPLE_BUNDLE: &str = "example-bundle";
pub const EXAMPLE: &str = "example";
pub const JSVALIDATE: &str = "jsvalidate";
pub const DEFAULT: &str = "default";

/// Register the seven built-in tasks.
pub fn register_builtin(builder: &mut TaskGraphBuilder, p: &PipelineSection) -> Result<()> {
    let sources = FileSet::new(p.sources.iter().cloned());
    let foreigns = FileSet::new(p.foreigns.iter().cloned());
    let output_dir = PathBuf::from(&p.output_dir);
    let compiled = FileSet::new([p.compiled_js_glob()]);

    builder
        .register(CLEAN, no_prerequisites(), Some(Action::Clean(CleanAction::new(&output_dir))))?
        .register(
            MAKE,
            no_prerequisites(),
            Some(Action::Compile(CompileAction {
                sources: sources.clone(),
                foreigns: foreigns.clone(),
                output_dir: output_dir.clone(),
            })),
        )?
        .register(
            EXAMPLE_MAKE,
            no_prerequisites(),
            Some(Action::Compile(CompileAction {
                sources: sources.chain(&FileSet::new(p.example_sources.iter().cloned())),
                foreigns: foreigns.chain(&FileSet::new(p.example_foreigns.iter().cloned())),
                output_dir,
            })),
        )?
        .register(
            EXAMPLE_BUNDLE,
            [EXAMPLE_MAKE],
            Some(Action::Bundle(BundleAction {
                artifacts: compiled.clone(),
                main: p.bundle_main.clone(),
                output: PathBuf::from(&p.bundle_output),
            })),
        )?
        .register(
            EXAMPLE,
            [EXAMPLE_BUNDLE],
            Some(Action::Package(PackageAction {
                input: PathBuf::from(&p.bundle_output),
                filename: p.package_filename.clone(),
                dest: PathBuf::from(&p.package_dest),
                modules_directories: p.modules_directories.clone(),
            })),
        )?
        .register(
            JSVALIDATE,
            [MAKE],
            Some(Action::Validate(ValidateAction {
                artifacts: compiled,
            })),
        )?
        .register(DEFAULT, [JSVALIDATE, EXAMPLE], None)?;

    Ok(())
}

fn no_prerequisites() -> [&'static str; 0] {
    []
}

/// Translate a config-file action, filling gaps from `[pipeline]`.
pub fn action_from_config(action: &ActionConfig, p: &PipelineSection) -> Action {
    let or_default = |value: &Option<String>, default: &str| {
        value.clone().unwrap_or_else(|| default.to_string())
    };

    match action {
        ActionConfig::Clean { dir } => {
            Action::Clean(CleanAction::new(or_default(dir, &p.output_dir)))
        }
        ActionConfig::Compile { src, ffi, output } => Action::Compile(CompileAction {
            sources: FileSet::new(src.iter().cloned()),
            foreigns: FileSet::new(ffi.iter().cloned()),
            output_dir: PathBuf::from(or_default(output, &p.output_dir)),
        }),
        ActionConfig::Bundle { src, main, output } => Action::Bundle(BundleAction {
            artifacts: FileSet::new([or_default(src, &p.compiled_js_glob())]),
            main: or_default(main, &p.bundle_main),
            output: PathBuf::from(or_default(output, &p.bundle_output)),
        }),
        ActionConfig::Validate { src } => Action::Validate(ValidateAction {
            artifacts: FileSet::new([or_default(src, &p.compiled_js_glob())]),
        }),
        ActionConfig::Package {
            input,
            filename,
            dest,
            modules_directories,
        } => Action::Package(PackageAction {
            input: PathBuf::from(or_default(input, &p.bundle_output)),
            filename: or_default(filename, &p.package_filename),
            dest: PathBuf::from(or_default(dest, &p.package_dest)),
            modules_directories: modules_directories
                .clone()
                .unwrap_or_else(|| p.modules_directories.clone()),
        }),
        ActionConfig::Shell { cmd } => Action::Shell(ShellAction::new(cmd.clone())),
    }
}

/// Build the task graph for a validated configuration.
///
/// Built-in tasks are registered first (unless disabled), then config tasks
/// in name order; a config task reusing a built-in name is a duplicate.
pub fn build_task_graph(cfg: &ConfigFile) -> Result<TaskGraph> {
    let mut builder = TaskGraph::builder();

    if cfg.config_section().builtin_pipeline {
        register_builtin(&mut builder, cfg.pipeline())?;
    }

    for (name, task) in cfg.tasks() {
        let action = task
            .action
            .as_ref()
            .map(|a| action_from_config(a, cfg.pipeline()));
        debug!(task = %name, kind = ?action.as_ref().map(Action::kind), "registering config task");
        builder.register(name.clone(), task.after.iter().cloned(), action)?;
    }

    builder.build()
}
