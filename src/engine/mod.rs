// src/engine/mod.rs

//! Orchestration engine for taskdag.
//!
//! This module ties together the scheduler and the executor:
//! - the pure core state machine lives in [`core`];
//! - the async/IO shell reading events and dispatching tasks is in
//!   [`runtime`];
//! - [`report`] describes how an invocation ended.

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a task's action for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Failed with a human-readable reason.
    Failed(String),
}

/// Events flowing into the runtime from the executor and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task's action finished with a concrete outcome.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Stop scheduling (e.g. Ctrl-C); running tasks are awaited.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod report;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use report::{RunReport, TaskFailure};
pub use runtime::Runtime;
