// src/dag/task_info.rs

//! Task metadata and per-run state.

use std::sync::Arc;

use crate::action::Action;
use crate::dag::graph::Task;
use crate::engine::TaskName;

/// Per-run state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting for prerequisites.
    Pending,
    /// Dispatched to the executor.
    Running,
    Succeeded,
    Failed,
    /// Never started because the run stopped scheduling (a failure or an
    /// interrupt happened first).
    Skipped,
}

impl TaskRunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskRunState::Succeeded | TaskRunState::Failed | TaskRunState::Skipped
        )
    }
}

/// Static task information from the graph, plus per-run state.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    /// Direct prerequisites.
    pub deps: Vec<TaskName>,
    pub action: Option<Arc<Action>>,
    pub state: TaskRunState,
}

impl TaskInfo {
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            deps: task.prerequisites.clone(),
            action: task.action.clone(),
            state: TaskRunState::Pending,
        }
    }
}

/// Description of a task that the scheduler wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub action: Option<Arc<Action>>,
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo) -> Self {
        Self {
            name: info.name.clone(),
            action: info.action.clone(),
        }
    }
}
