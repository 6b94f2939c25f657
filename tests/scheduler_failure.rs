// tests/scheduler_failure.rs

mod common;

use std::collections::HashSet;

use taskdag::dag::{ScheduledTask, Scheduler, TaskRunState};
use taskdag::engine::TaskOutcome;
use taskdag_test_utils::builders::pipeline_shape_graph;

use common::init_tracing;

fn names(tasks: &[ScheduledTask]) -> HashSet<&str> {
    tasks.iter().map(|t| t.name.as_str()).collect()
}

fn default_scheduler() -> Scheduler {
    let graph = pipeline_shape_graph();
    let plan = graph.plan("default").unwrap();
    Scheduler::from_plan(&graph, &plan)
}

#[test]
fn start_dispatches_only_tasks_without_prerequisites() {
    init_tracing();
    let mut scheduler = default_scheduler();

    let started = scheduler.start();
    assert_eq!(names(&started), HashSet::from(["make", "example-make"]));
    assert_eq!(scheduler.run_state_of("make"), Some(TaskRunState::Running));
    assert_eq!(scheduler.run_state_of("default"), Some(TaskRunState::Pending));
    assert_eq!(scheduler.deps_satisfied("jsvalidate"), Some(false));
}

#[test]
fn aggregate_task_waits_for_every_prerequisite() {
    let mut scheduler = default_scheduler();
    scheduler.start();

    let next = scheduler.handle_completion("make", TaskOutcome::Success);
    assert_eq!(names(&next), HashSet::from(["jsvalidate"]));
    assert!(scheduler.handle_completion("jsvalidate", TaskOutcome::Success).is_empty());

    let next = scheduler.handle_completion("example-make", TaskOutcome::Success);
    assert_eq!(names(&next), HashSet::from(["example-bundle"]));
    let next = scheduler.handle_completion("example-bundle", TaskOutcome::Success);
    assert_eq!(names(&next), HashSet::from(["example"]));

    let next = scheduler.handle_completion("example", TaskOutcome::Success);
    assert_eq!(names(&next), HashSet::from(["default"]));
    assert!(!scheduler.is_finished());

    scheduler.handle_completion("default", TaskOutcome::Success);
    assert!(scheduler.is_finished());
    assert!(scheduler.report().is_success());
}

#[test]
fn failure_stops_scheduling_but_running_tasks_complete() {
    init_tracing();
    let mut scheduler = default_scheduler();
    scheduler.start();

    // `example-make` is still running when `make` fails.
    let step = scheduler.step_completion("make", TaskOutcome::Failed("boom".into()));
    assert!(step.newly_scheduled.is_empty());
    assert!(!step.run_just_finished);
    assert!(scheduler.is_halted());
    assert_eq!(scheduler.run_state_of("example-make"), Some(TaskRunState::Running));
    for skipped in ["jsvalidate", "example-bundle", "example", "default"] {
        assert!(step.newly_skipped.iter().any(|t| t == skipped), "{skipped} not skipped");
    }

    // Its success no longer unlocks `example-bundle`.
    let step = scheduler.step_completion("example-make", TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert!(step.run_just_finished);

    let report = scheduler.report();
    assert_eq!(report.state_of("make"), Some(TaskRunState::Failed));
    assert_eq!(report.state_of("example-make"), Some(TaskRunState::Succeeded));
    assert_eq!(report.state_of("example-bundle"), Some(TaskRunState::Skipped));
    let failure = report.failure.clone().expect("failure recorded");
    assert_eq!(failure.task, "make");
    assert_eq!(failure.reason, "boom");
}

#[test]
fn first_failure_wins() {
    let mut scheduler = default_scheduler();
    scheduler.start();

    scheduler.handle_completion("example-make", TaskOutcome::Failed("first".into()));
    scheduler.handle_completion("make", TaskOutcome::Failed("second".into()));

    let failure = scheduler.first_failure().expect("failure recorded");
    assert_eq!(failure.task, "example-make");
    assert_eq!(failure.reason, "first");
    assert!(scheduler.is_finished());
}

#[test]
fn stray_completions_are_ignored() {
    let mut scheduler = default_scheduler();
    scheduler.start();

    // Unknown task and a task that was never dispatched.
    assert!(scheduler.handle_completion("deploy", TaskOutcome::Success).is_empty());
    assert!(scheduler.handle_completion("example", TaskOutcome::Success).is_empty());
    assert_eq!(scheduler.run_state_of("example"), Some(TaskRunState::Pending));

    // A repeated completion does not dispatch dependents twice.
    let next = scheduler.handle_completion("make", TaskOutcome::Success);
    assert_eq!(names(&next), HashSet::from(["jsvalidate"]));
    assert!(scheduler.handle_completion("make", TaskOutcome::Success).is_empty());
}

#[test]
fn interrupt_skips_pending_tasks() {
    let mut scheduler = default_scheduler();
    scheduler.start();

    let step = scheduler.interrupt();
    assert!(step.newly_scheduled.is_empty());
    assert!(!step.run_just_finished);

    scheduler.handle_completion("make", TaskOutcome::Success);
    let step = scheduler.step_completion("example-make", TaskOutcome::Success);
    assert!(step.run_just_finished);

    let report = scheduler.report();
    assert!(report.interrupted);
    assert!(report.failure.is_none());
    assert!(!report.is_success());
    let succeeded: HashSet<&str> = report.tasks_in(TaskRunState::Succeeded).into_iter().collect();
    assert_eq!(succeeded, HashSet::from(["make", "example-make"]));
    assert_eq!(report.state_of("default"), Some(TaskRunState::Skipped));
}
