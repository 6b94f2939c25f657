// src/dag/mod.rs

//! Task graph representation and scheduling.
//!
//! - [`graph`] holds the registration builder and the validated task graph.
//! - [`plan`] is the set of tasks one invocation runs, in topological order.
//! - [`scheduler`] contains the per-run state machine that decides
//!   which tasks are ready to run, and stops scheduling after a failure.
//! - [`task_info`] provides task metadata and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-run state transitions.

pub mod graph;
pub mod plan;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::{Task, TaskGraph, TaskGraphBuilder};
pub use plan::ExecutionPlan;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, TaskRunState};
