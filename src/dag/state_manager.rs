// src/dag/state_manager.rs

//! Per-run state transitions for tasks in the scheduler.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    /// Plan order; keeps dispatch order deterministic.
    order: &'a [TaskName],
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(order: &'a [TaskName], tasks: &'a mut HashMap<TaskName, TaskInfo>) -> Self {
        Self { order, tasks }
    }

    /// Determine whether every prerequisite of the task has succeeded.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        let ro = ReadOnlyStateManager::new(self.tasks);
        ro.deps_satisfied_for_info(info)
    }

    /// Collect tasks that are `Pending` and whose prerequisites all
    /// succeeded, mark them as `Running`, and return them as
    /// `ScheduledTask`s.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let candidates: Vec<TaskName> = self
            .order
            .iter()
            .filter(|name| {
                self.tasks.get(name.as_str()).is_some_and(|info| {
                    info.state == TaskRunState::Pending && self.deps_satisfied_for_info(info)
                })
            })
            .cloned()
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                info!(task = %info.name, "prerequisites satisfied; scheduling task");
                info.state = TaskRunState::Running;
                ready.push(ScheduledTask::from_task_info(info));
            }
        }

        ready
    }

    /// Mark every still-pending task as `Skipped`.
    ///
    /// Returns the names that changed, in plan order.
    pub fn skip_pending(&mut self) -> Vec<TaskName> {
        let mut skipped = Vec::new();
        for name in self.order {
            if let Some(info) = self.tasks.get_mut(name) {
                if info.state == TaskRunState::Pending {
                    debug!(task = %info.name, "scheduling stopped; skipping task");
                    info.state = TaskRunState::Skipped;
                    skipped.push(info.name.clone());
                }
            }
        }
        skipped
    }
}

/// A read-only view of the state manager for checking dependency satisfaction.
///
/// This is used when we only have shared access to the tasks map (e.g. in `Scheduler::deps_satisfied`).
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a HashMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a HashMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// A prerequisite only counts once it has `Succeeded` in this run;
    /// there is no history across invocations.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| match self.tasks.get(dep_name) {
            Some(dep) => dep.state == TaskRunState::Succeeded,
            None => {
                warn!(
                    task = %info.name,
                    dep = %dep_name,
                    "dependency missing from tasks map"
                );
                false
            }
        })
    }
}
