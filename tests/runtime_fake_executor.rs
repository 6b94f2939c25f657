// tests/runtime_fake_executor.rs

mod common;

use std::error::Error;

use tokio::sync::mpsc;

use taskdag::dag::{Scheduler, TaskGraph, TaskRunState};
use taskdag::engine::{CoreRuntime, RunReport, Runtime, RuntimeEvent};
use taskdag::errors::TaskdagError;
use taskdag_test_utils::builders::pipeline_shape_graph;
use taskdag_test_utils::fake_executor::{ExecEvent, ExecLog, FakeExecutor};

use common::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

async fn run_with(
    graph: &TaskGraph,
    target: &str,
    configure: impl FnOnce(FakeExecutor) -> FakeExecutor,
    before_start: Option<RuntimeEvent>,
) -> Result<(RunReport, ExecLog), Box<dyn Error>> {
    let plan = graph.plan(target)?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let log = ExecLog::default();
    let executor = configure(FakeExecutor::new(rt_tx.clone(), log.clone()));

    if let Some(event) = before_start {
        rt_tx.send(event).await?;
    }

    let core = CoreRuntime::new(Scheduler::from_plan(graph, &plan));
    let runtime = Runtime::new(core, rt_rx, executor);
    let report = with_timeout(runtime.run()).await?;
    Ok((report, log))
}

fn finished_before_started(log: &ExecLog, prerequisite: &str, task: &str) -> bool {
    let finished = log.position(&ExecEvent::Finished(prerequisite.to_string()));
    let started = log.position(&ExecEvent::Started(task.to_string()));
    matches!((finished, started), (Some(f), Some(s)) if f < s)
}

#[tokio::test]
async fn default_target_runs_every_task_once_in_dependency_order() -> TestResult {
    init_tracing();
    let graph = pipeline_shape_graph();

    let (report, log) = run_with(&graph, "default", |e| e, None).await?;

    assert!(report.is_success(), "report: {report:?}");

    let started = log.started();
    assert_eq!(started.len(), 6, "each task exactly once: {started:?}");
    for task in graph.tasks() {
        for prerequisite in &task.prerequisites {
            assert!(
                finished_before_started(&log, prerequisite, &task.name),
                "{prerequisite} must finish before {} starts: {:?}",
                task.name,
                log.events()
            );
        }
    }
    assert_eq!(started.last().map(String::as_str), Some("default"));

    Ok(())
}

#[tokio::test]
async fn failure_skips_dependents_and_surfaces_the_task() -> TestResult {
    init_tracing();
    let graph = pipeline_shape_graph();

    let (report, log) = run_with(
        &graph,
        "default",
        |e| e.failing("example-bundle", "bundler exited with code 2"),
        None,
    )
    .await?;

    assert!(!report.is_success());
    assert_eq!(report.state_of("example-bundle"), Some(TaskRunState::Failed));
    assert_eq!(report.state_of("example"), Some(TaskRunState::Skipped));
    assert_eq!(report.state_of("default"), Some(TaskRunState::Skipped));
    assert!(!log.started().iter().any(|t| t == "example" || t == "default"));

    match report.into_result() {
        Err(TaskdagError::TaskFailed { task, reason }) => {
            assert_eq!(task, "example-bundle");
            assert!(reason.contains("code 2"));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn running_sibling_completes_after_a_failure() -> TestResult {
    init_tracing();
    let graph = pipeline_shape_graph();

    // `make` and `example-make` are dispatched together.
    let (report, log) =
        run_with(&graph, "default", |e| e.failing("example-make", "boom"), None).await?;

    assert!(log.position(&ExecEvent::Finished("make".into())).is_some());
    assert_eq!(report.state_of("make"), Some(TaskRunState::Succeeded));
    assert_eq!(report.state_of("example-make"), Some(TaskRunState::Failed));
    assert_eq!(report.state_of("example-bundle"), Some(TaskRunState::Skipped));
    assert!(report.tasks.iter().all(|(_, s)| s.is_terminal()));

    Ok(())
}

#[tokio::test]
async fn shutdown_request_stops_scheduling() -> TestResult {
    init_tracing();
    let graph = pipeline_shape_graph();

    let (report, log) = run_with(
        &graph,
        "default",
        |e| e,
        Some(RuntimeEvent::ShutdownRequested),
    )
    .await?;

    let mut started = log.started();
    started.sort();
    assert_eq!(started, ["example-make", "make"]);
    assert!(report.interrupted);
    assert_eq!(report.state_of("default"), Some(TaskRunState::Skipped));
    assert!(matches!(report.into_result(), Err(TaskdagError::Interrupted)));

    Ok(())
}
