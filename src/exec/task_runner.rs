// src/exec/task_runner.rs

//! Individual task runner.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::action::ActionContext;
use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};

/// Run a single task's action and emit exactly one `TaskCompleted` event.
///
/// The action runs in its own Tokio task so that a panic inside it is
/// reported as a failure instead of leaving the runtime waiting.
pub async fn run_task(
    task: ScheduledTask,
    ctx: Arc<ActionContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let started = Instant::now();

    let outcome = match task.action.clone() {
        None => {
            debug!(task = %task.name, "no action; prerequisites complete");
            TaskOutcome::Success
        }
        Some(action) => {
            info!(task = %task.name, kind = action.kind(), "starting task");
            let handle = tokio::spawn(async move { action.execute(&ctx).await });

            match handle.await {
                Ok(Ok(())) => TaskOutcome::Success,
                Ok(Err(err)) => {
                    error!(task = %task.name, error = %format!("{err:#}"), "task failed");
                    TaskOutcome::Failed(format!("{err:#}"))
                }
                Err(join_err) => {
                    error!(task = %task.name, error = %join_err, "task panicked");
                    TaskOutcome::Failed(format!("task panicked: {join_err}"))
                }
            }
        }
    };

    info!(
        task = %task.name,
        success = outcome == TaskOutcome::Success,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "task finished"
    );

    if runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        warn!(task = %task.name, "runtime no longer listening; dropping completion");
    }
}
