// src/exec/mod.rs

//! Action execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` the runtime uses in production; tests can replace
//!   it with a fake implementation.
//! - [`executor_loop`] owns the background loop receiving scheduled tasks.
//! - [`task_runner`] runs one task's action and reports the outcome.
//! - [`tool`] runs external programs on behalf of actions.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;
pub mod tool;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
pub use tool::{ProcessToolRunner, ToolInvocation, ToolOutput, ToolRunner};
