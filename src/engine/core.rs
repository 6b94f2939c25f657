// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - sending `ScheduledTask`s to the executor
//!
//! The core can be unit tested without any Tokio, channels, filesystem, or
//! processes.

use crate::dag::Scheduler;
use crate::engine::event_handlers::{
    handle_shutdown, handle_task_completion, start_run, CoreStep,
};
use crate::engine::{RunReport, RuntimeEvent};

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Whether every task of the plan reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Kick off the run: dispatch every task without prerequisites.
    pub fn start(&mut self) -> CoreStep {
        start_run(&mut self.scheduler)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskCompleted { task, outcome } => {
                handle_task_completion(&mut self.scheduler, task, outcome)
            }
            RuntimeEvent::ShutdownRequested => handle_shutdown(&mut self.scheduler),
        }
    }

    pub fn report(&self) -> RunReport {
        self.scheduler.report()
    }
}
