// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::EmptyGlobPolicy;

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Run a dependency-ordered build pipeline of compile, bundle, validate and package tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (its prerequisites run first).
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Path to the pipeline file (TOML).
    ///
    /// If omitted, `Taskdag.toml` in the current directory is used when it
    /// exists; otherwise the built-in pipeline runs with built-in settings.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Project root that glob patterns and output paths are relative to.
    ///
    /// Defaults to the directory containing the config file, or the current
    /// working directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` filter directives are used (for example
    /// `info,taskdag::action=debug`), falling back to `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// What to do when a glob matches no input files: `error` or `allow`.
    ///
    /// Overrides `[config].empty_globs` from the pipeline file.
    #[arg(long, value_name = "POLICY")]
    pub empty_globs: Option<EmptyGlobPolicy>,

    /// Validate the graph and print the execution plan without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print every registered task with its prerequisites and exit.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
