// src/exec/executor_loop.rs

//! Main executor loop that runs task actions.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::ActionContext;
use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskName};
use crate::exec::task_runner::run_task;

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<ScheduledTask>` is what
/// `RealExecutorBackend` forwards to. Each scheduled task runs in its own
/// Tokio task, so independent tasks execute concurrently. A task name is
/// only ever run once per loop; repeated dispatches are dropped.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: Arc<ActionContext>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut dispatched: HashSet<TaskName> = HashSet::new();

        while let Some(task) = rx.recv().await {
            if !dispatched.insert(task.name.clone()) {
                warn!(task = %task.name, "task already dispatched in this invocation; ignoring");
                continue;
            }

            let rt_tx = runtime_tx.clone();
            let ctx = Arc::clone(&ctx);
            let name = task.name.clone();

            tokio::spawn(async move {
                run_task(task, ctx, rt_tx).await;
                debug!(task = %name, "task runner future finished");
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
