use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use taskdag::dag::ScheduledTask;
use taskdag::engine::{RuntimeEvent, TaskOutcome};
use taskdag::errors::Result;
use taskdag::exec::ExecutorBackend;

/// What the fake executor observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecEvent {
    Started(String),
    Finished(String),
}

/// Shared, inspectable log of executor events.
#[derive(Debug, Clone, Default)]
pub struct ExecLog(Arc<Mutex<Vec<ExecEvent>>>);

impl ExecLog {
    pub fn push(&self, event: ExecEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ExecEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Task names in start order.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ExecEvent::Started(name) => Some(name),
                ExecEvent::Finished(_) => None,
            })
            .collect()
    }

    pub fn position(&self, event: &ExecEvent) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// A fake executor that:
/// - records which tasks were "run"
/// - completes each task from a spawned Tokio task, so completions arrive
///   asynchronously like real actions
/// - fails the tasks listed in `failing` with a fixed reason
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    log: ExecLog,
    failing: HashMap<String, String>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, log: ExecLog) -> Self {
        Self {
            runtime_tx,
            log,
            failing: HashMap::new(),
        }
    }

    pub fn failing(mut self, task: &str, reason: &str) -> Self {
        self.failing.insert(task.to_string(), reason.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let log = self.log.clone();
        let failing = self.failing.clone();

        Box::pin(async move {
            for t in tasks {
                log.push(ExecEvent::Started(t.name.clone()));

                let outcome = match failing.get(&t.name) {
                    Some(reason) => TaskOutcome::Failed(reason.clone()),
                    None => TaskOutcome::Success,
                };

                let tx = tx.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    log.push(ExecEvent::Finished(t.name.clone()));
                    let _ = tx
                        .send(RuntimeEvent::TaskCompleted {
                            task: t.name,
                            outcome,
                        })
                        .await;
                });
            }
            Ok(())
        })
    }
}
