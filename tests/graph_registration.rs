// tests/graph_registration.rs

mod common;

use std::iter;

use taskdag::config::ConfigFile;
use taskdag::dag::TaskGraph;
use taskdag::errors::TaskdagError;
use taskdag::pipeline::{self, build_task_graph};
use taskdag_test_utils::builders::{pipeline_shape_graph, ConfigFileBuilder, TaskConfigBuilder};

use common::init_tracing;

fn no_deps() -> iter::Empty<&'static str> {
    iter::empty()
}

fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
}

#[test]
fn forward_references_resolve_at_build() {
    init_tracing();

    let mut builder = TaskGraph::builder();
    builder
        .register("default", ["jsvalidate"], None)
        .unwrap()
        .register("jsvalidate", ["make"], None)
        .unwrap()
        .register("make", no_deps(), None)
        .unwrap();

    let graph = builder.build().expect("forward references are allowed");
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.dependencies_of("default"), ["jsvalidate".to_string()]);
    assert_eq!(graph.dependents_of("make"), ["jsvalidate".to_string()]);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut builder = TaskGraph::builder();
    builder.register("make", no_deps(), None).unwrap();

    let err = builder.register("make", ["clean"], None).unwrap_err();
    assert!(
        matches!(&err, TaskdagError::DuplicateTask(name) if name == "make"),
        "unexpected error: {err}"
    );
    // The first registration is untouched.
    assert!(builder.contains("make"));
}

#[test]
fn cycle_is_reported_with_its_members() {
    let mut builder = TaskGraph::builder();
    builder
        .register("a", ["b"], None)
        .unwrap()
        .register("b", ["c"], None)
        .unwrap()
        .register("c", ["a"], None)
        .unwrap()
        .register("d", ["a"], None)
        .unwrap();

    match builder.build() {
        Err(TaskdagError::CyclicDependency { cycle }) => {
            assert_eq!(cycle.first(), cycle.last(), "cycle should be closed: {cycle:?}");
            assert_eq!(cycle.len(), 4, "a, b, c plus the repeated start: {cycle:?}");
            for name in ["a", "b", "c"] {
                assert!(cycle.iter().any(|n| n == name), "{name} missing from {cycle:?}");
            }
            assert!(!cycle.iter().any(|n| n == "d"), "d is not on the cycle");
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

#[test]
fn self_dependency_is_a_cycle() {
    let mut builder = TaskGraph::builder();
    builder.register("loop", ["loop"], None).unwrap();

    match builder.build() {
        Err(TaskdagError::CyclicDependency { cycle }) => {
            assert_eq!(cycle, vec!["loop".to_string(), "loop".to_string()]);
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

#[test]
fn unresolved_prerequisite_is_a_configuration_error() {
    let mut builder = TaskGraph::builder();
    builder.register("bundle", ["compile"], None).unwrap();

    match builder.build() {
        Err(TaskdagError::UnresolvedPrerequisite { task, prerequisite }) => {
            assert_eq!(task, "bundle");
            assert_eq!(prerequisite, "compile");
        }
        other => panic!("expected UnresolvedPrerequisite, got {other:?}"),
    }
}

#[test]
fn planning_an_unknown_target_fails() {
    let graph = pipeline_shape_graph();
    let err = graph.plan("deploy").unwrap_err();
    assert!(matches!(&err, TaskdagError::UnknownTask(name) if name == "deploy"));
}

#[test]
fn plan_contains_only_the_closure_in_dependency_order() {
    let graph = pipeline_shape_graph();

    let plan = graph.plan("jsvalidate").unwrap();
    assert_eq!(plan.order(), ["make".to_string(), "jsvalidate".to_string()]);

    let plan = graph.plan("default").unwrap();
    assert_eq!(plan.len(), 6);
    let order = plan.order();
    for task in graph.tasks() {
        for prerequisite in &task.prerequisites {
            assert!(
                position(order, prerequisite) < position(order, &task.name),
                "{prerequisite} must precede {} in {order:?}",
                task.name
            );
        }
    }
}

#[test]
fn builtin_pipeline_has_the_expected_shape() {
    let graph = build_task_graph(&ConfigFile::default()).unwrap();

    assert_eq!(graph.len(), 7);
    assert!(graph.dependencies_of(pipeline::CLEAN).is_empty());
    assert!(graph.dependencies_of(pipeline::MAKE).is_empty());
    assert!(graph.dependencies_of(pipeline::EXAMPLE_MAKE).is_empty());
    assert_eq!(graph.dependencies_of(pipeline::EXAMPLE_BUNDLE), ["example-make".to_string()]);
    assert_eq!(graph.dependencies_of(pipeline::EXAMPLE), ["example-bundle".to_string()]);
    assert_eq!(graph.dependencies_of(pipeline::JSVALIDATE), ["make".to_string()]);
    assert_eq!(
        graph.dependencies_of(pipeline::DEFAULT),
        ["jsvalidate".to_string(), "example".to_string()]
    );
    assert!(graph.task(pipeline::DEFAULT).unwrap().action.is_none());

    // `clean` is never part of the default run.
    let plan = graph.plan(pipeline::DEFAULT).unwrap();
    assert_eq!(plan.len(), 6);
    assert!(!plan.contains(pipeline::CLEAN));
}

#[test]
fn config_task_cannot_shadow_a_builtin() {
    let cfg = ConfigFileBuilder::new()
        .with_task("make", TaskConfigBuilder::shell("make all").build())
        .build();

    let err = build_task_graph(&cfg).unwrap_err();
    assert!(matches!(&err, TaskdagError::DuplicateTask(name) if name == "make"));
}

#[test]
fn config_tasks_can_depend_on_builtins() {
    let cfg = ConfigFileBuilder::new()
        .with_task("lint", TaskConfigBuilder::shell("eslint output").after("make").build())
        .with_task("ci", TaskConfigBuilder::new().after("lint").after("default").build())
        .build();

    let graph = build_task_graph(&cfg).unwrap();
    assert_eq!(graph.len(), 9);

    let plan = graph.plan("ci").unwrap();
    assert!(plan.contains("lint"));
    assert!(plan.contains("example"));
    assert_eq!(plan.order().last().map(String::as_str), Some("ci"));
}

#[test]
fn config_cycle_is_detected_before_running() {
    let cfg = ConfigFileBuilder::new()
        .without_builtin_pipeline()
        .with_task("a", TaskConfigBuilder::shell("true").after("b").build())
        .with_task("b", TaskConfigBuilder::shell("true").after("a").build())
        .build();

    assert!(matches!(
        build_task_graph(&cfg),
        Err(TaskdagError::CyclicDependency { .. })
    ));
}
