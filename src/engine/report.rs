// src/engine/report.rs

use crate::dag::TaskRunState;
use crate::engine::TaskName;
use crate::errors::{Result, TaskdagError};

/// The first task failure of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: TaskName,
    pub reason: String,
}

/// How an invocation ended.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The task that was asked for.
    pub target: TaskName,
    /// Every task of the plan with its final state, in plan order.
    pub tasks: Vec<(TaskName, TaskRunState)>,
    pub failure: Option<TaskFailure>,
    pub interrupted: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
            && !self.interrupted
            && self.tasks.iter().all(|(_, s)| *s == TaskRunState::Succeeded)
    }

    pub fn state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks
            .iter()
            .find(|(name, _)| name == task)
            .map(|(_, state)| *state)
    }

    /// Names of tasks that ended in `state`, in plan order.
    pub fn tasks_in(&self, state: TaskRunState) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|(_, s)| *s == state)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Turn the report into an error if the invocation did not fully succeed.
    ///
    /// A task failure wins over an interrupt.
    pub fn into_result(self) -> Result<RunReport> {
        if let Some(failure) = &self.failure {
            return Err(TaskdagError::TaskFailed {
                task: failure.task.clone(),
                reason: failure.reason.clone(),
            });
        }
        if !self.is_success() {
            return Err(TaskdagError::Interrupted);
        }
        Ok(self)
    }
}
