use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::plan::ExecutionPlan;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{RunReport, TaskFailure, TaskName, TaskOutcome};

/// Per-invocation state machine over an [`ExecutionPlan`].
///
/// It is responsible for:
/// - handing out tasks whose prerequisites have all succeeded
/// - handing out each task at most once
/// - recording outcomes, and remembering the first failure
/// - stopping all further scheduling once anything fails or the run is halted
#[derive(Debug)]
pub struct Scheduler {
    target: TaskName,
    order: Vec<TaskName>,
    tasks: HashMap<TaskName, TaskInfo>,
    /// Set once scheduling stopped (failure or interrupt).
    halted: bool,
    interrupted: bool,
    first_failure: Option<TaskFailure>,
}

impl Scheduler {
    /// Construct a scheduler for the tasks of `plan`.
    pub fn from_plan(graph: &TaskGraph, plan: &ExecutionPlan) -> Self {
        let tasks = plan
            .order()
            .iter()
            .filter_map(|name| graph.task(name))
            .map(|task| (task.name.clone(), TaskInfo::from_task(task)))
            .collect();

        Self {
            target: plan.target().to_string(),
            order: plan.order().to_vec(),
            tasks,
            halted: false,
            interrupted: false,
            first_failure: None,
        }
    }

    /// Tasks that can run immediately (those without prerequisites).
    pub fn start(&mut self) -> Vec<ScheduledTask> {
        self.step_start().newly_scheduled
    }

    /// Handle completion of a task with a concrete outcome (production API).
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Manual-step variant of [`Scheduler::start`].
    pub fn step_start(&mut self) -> SchedulerStep {
        debug!(target_task = %self.target, tasks = self.order.len(), "scheduler: starting run");
        let newly_scheduled = if self.halted {
            Vec::new()
        } else {
            StateManager::new(&self.order, &mut self.tasks).collect_new_ready_tasks()
        };

        SchedulerStep {
            newly_scheduled,
            newly_skipped: Vec::new(),
            run_just_finished: self.is_finished(),
        }
    }

    /// Manual-step variant of [`Scheduler::handle_completion`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let mut step = SchedulerStep::default();

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            return step;
        };

        if info.state != TaskRunState::Running {
            warn!(
                task = %task,
                state = ?info.state,
                "completion for task that is not running; ignoring"
            );
            return step;
        }

        match outcome {
            TaskOutcome::Success => {
                info.state = TaskRunState::Succeeded;
                debug!(task = %info.name, "task completed successfully");
                if !self.halted {
                    step.newly_scheduled =
                        StateManager::new(&self.order, &mut self.tasks).collect_new_ready_tasks();
                }
            }
            TaskOutcome::Failed(reason) => {
                info.state = TaskRunState::Failed;
                warn!(
                    task = %info.name,
                    reason = %reason,
                    "task failed; no further tasks will be scheduled"
                );
                if self.first_failure.is_none() {
                    self.first_failure = Some(TaskFailure {
                        task: info.name.clone(),
                        reason,
                    });
                }
                step.newly_skipped = self.halt_scheduling();
            }
        }

        step.run_just_finished = self.is_finished();
        if step.run_just_finished {
            info!(target_task = %self.target, "scheduler: all tasks terminal; run finished");
        }
        step
    }

    /// Stop scheduling because the invocation was interrupted.
    ///
    /// Running tasks are left to finish; pending ones are skipped.
    pub fn interrupt(&mut self) -> SchedulerStep {
        self.interrupted = true;
        let newly_skipped = self.halt_scheduling();
        SchedulerStep {
            newly_scheduled: Vec::new(),
            newly_skipped,
            run_just_finished: self.is_finished(),
        }
    }

    fn halt_scheduling(&mut self) -> Vec<TaskName> {
        self.halted = true;
        StateManager::new(&self.order, &mut self.tasks).skip_pending()
    }

    /// `true` once no task is pending or running.
    pub fn is_finished(&self) -> bool {
        self.tasks.values().all(|info| info.state.is_terminal())
    }

    /// Whether scheduling has stopped early.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks.get(task).map(|info| info.state)
    }

    /// Whether every prerequisite of `task` has succeeded.
    ///
    /// Returns `None` if the task is not part of the plan.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        let mgr = ReadOnlyStateManager::new(&self.tasks);
        Some(mgr.deps_satisfied_for_info(info))
    }

    /// Task names in plan order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn first_failure(&self) -> Option<&TaskFailure> {
        self.first_failure.as_ref()
    }

    /// Snapshot of every task's state, in plan order.
    pub fn report(&self) -> RunReport {
        RunReport {
            target: self.target.clone(),
            tasks: self
                .order
                .iter()
                .filter_map(|name| self.tasks.get(name).map(|info| (name.clone(), info.state)))
                .collect(),
            failure: self.first_failure.clone(),
            interrupted: self.interrupted,
        }
    }
}
