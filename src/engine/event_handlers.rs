// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, info};

use crate::dag::{ScheduledTask, Scheduler, SchedulerStep};
use crate::engine::{TaskName, TaskOutcome};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// Every task is terminal; the shell can stop.
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    /// Tasks dispatched by this step, across all commands.
    pub fn dispatched(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchTasks(tasks) => Some(tasks),
                CoreCommand::RequestExit => None,
            })
            .flatten()
            .map(|t| t.name.as_str())
            .collect()
    }
}

/// Seed a run with every task whose prerequisites are trivially satisfied.
pub fn start_run(scheduler: &mut Scheduler) -> CoreStep {
    core_step_from(scheduler.step_start())
}

/// Handle a task completion event.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    debug!(task = %task, ?outcome, "core: task completed");
    core_step_from(scheduler.step_completion(&task, outcome))
}

/// Handle a shutdown request: stop scheduling, keep waiting for whatever
/// is still running.
pub fn handle_shutdown(scheduler: &mut Scheduler) -> CoreStep {
    info!("shutdown requested; no further tasks will be scheduled");
    core_step_from(scheduler.interrupt())
}

fn core_step_from(step: SchedulerStep) -> CoreStep {
    let mut commands = Vec::new();

    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchTasks(step.newly_scheduled));
    }
    if !step.newly_skipped.is_empty() {
        debug!(skipped = ?step.newly_skipped, "core: tasks skipped");
    }

    let keep_running = !step.run_just_finished;
    if !keep_running {
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
