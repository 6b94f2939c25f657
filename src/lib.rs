// src/lib.rs

pub mod action;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod types;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::ActionContext;
use crate::cli::CliArgs;
use crate::config::{resolve_config, ConfigFile};
use crate::dag::{ExecutionPlan, Scheduler, TaskGraph};
use crate::engine::{CoreRuntime, RunReport, Runtime, RuntimeEvent};
use crate::errors::Result;
use crate::exec::{ProcessToolRunner, RealExecutorBackend};
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or built-in settings)
/// - task graph registration and validation
/// - scheduler / runtime / executor
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<RunReport> {
    let config_path = args.config.as_deref().map(Path::new);
    let (cfg, loaded_from) = resolve_config(config_path)?;

    let graph = pipeline::build_task_graph(&cfg)?;

    if args.list {
        print_task_list(&graph);
        return Ok(empty_report(&args.task));
    }

    // Configuration errors (unknown target, cycles) surface here, before
    // any action runs.
    let plan = graph.plan(&args.task)?;

    if args.dry_run {
        print_dry_run(&graph, &plan);
        return Ok(empty_report(&args.task));
    }

    let root = project_root(args.root.as_deref(), loaded_from.as_deref());
    info!(root = %root.display(), task = %plan.target(), "running pipeline");

    let mut ctx = action_context(&cfg, root);
    if let Some(policy) = args.empty_globs {
        debug!(?policy, "empty-glob policy overridden on the command line");
        ctx = ctx.with_empty_globs(policy);
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let report = execute_until(&graph, &plan, ctx, shutdown).await?;
    report.into_result()
}

/// Execution context for real runs: real filesystem, real processes.
pub fn action_context(cfg: &ConfigFile, root: PathBuf) -> ActionContext {
    ActionContext::new(root, Arc::new(RealFileSystem), Arc::new(ProcessToolRunner))
        .with_tools(cfg.tools().clone())
        .with_empty_globs(cfg.config_section().empty_globs)
}

/// Run `target` and its prerequisites to completion.
///
/// Task failures are reported in the returned [`RunReport`]; `Err` is
/// reserved for configuration errors and runtime plumbing failures.
pub async fn execute(graph: &TaskGraph, target: &str, ctx: ActionContext) -> Result<RunReport> {
    let plan = graph.plan(target)?;
    execute_until(graph, &plan, ctx, std::future::pending()).await
}

/// Like [`execute`], but stops scheduling new tasks once `shutdown`
/// resolves. Already running tasks are still awaited.
pub async fn execute_until<F>(
    graph: &TaskGraph,
    plan: &ExecutionPlan,
    ctx: ActionContext,
    shutdown: F,
) -> Result<RunReport>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone(), Arc::new(ctx));

    let shutdown_task = {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        })
    };
    drop(rt_tx);

    let core = CoreRuntime::new(Scheduler::from_plan(graph, plan));
    let runtime = Runtime::new(core, rt_rx, executor);
    let report = runtime.run().await;

    shutdown_task.abort();
    report
}

/// Project root for globs and tool working directories.
///
/// - `--root` wins if given.
/// - Otherwise the directory holding the config file, if it has one.
/// - Otherwise the current working directory.
fn project_root(explicit: Option<&str>, config_path: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return PathBuf::from(root);
    }
    match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn empty_report(target: &str) -> RunReport {
    RunReport {
        target: target.to_string(),
        tasks: Vec::new(),
        failure: None,
        interrupted: false,
    }
}

fn print_task_list(graph: &TaskGraph) {
    println!("tasks ({}):", graph.len());
    for task in graph.tasks() {
        println!("  - {}", task.name);
        if !task.prerequisites.is_empty() {
            println!("      after: {:?}", task.prerequisites);
        }
        if let Some(action) = &task.action {
            println!("      action: {action}");
        }
    }
}

fn print_dry_run(graph: &TaskGraph, plan: &ExecutionPlan) {
    println!("taskdag dry-run: {}", plan.target());
    println!();

    for (i, name) in plan.order().iter().enumerate() {
        let action = graph
            .task(name)
            .and_then(|t| t.action.as_ref())
            .map(|a| a.to_string())
            .unwrap_or_else(|| "(no action)".to_string());
        println!("  {}. {name}: {action}", i + 1);
        let deps = graph.dependencies_of(name);
        if !deps.is_empty() {
            println!("      after: {:?}", deps);
        }
    }

    debug!("dry-run complete (no execution)");
}
