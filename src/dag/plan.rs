// src/dag/plan.rs

use crate::engine::TaskName;

/// The tasks one invocation will run, in a valid execution order.
///
/// `order` lists the target's transitive prerequisites and the target
/// itself, prerequisites before dependents. The scheduler may still run
/// unrelated tasks concurrently; the order is what a sequential runner
/// would do and what `--dry-run` prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    target: TaskName,
    order: Vec<TaskName>,
}

impl ExecutionPlan {
    pub(crate) fn new(target: TaskName, order: Vec<TaskName>) -> Self {
        Self { target, order }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    pub fn contains(&self, task: &str) -> bool {
        self.order.iter().any(|t| t == task)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
