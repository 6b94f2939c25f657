#![allow(dead_code)]

use std::sync::Arc;

use taskdag::action::ActionContext;
use taskdag::fs::mock::MockFileSystem;
use taskdag::types::EmptyGlobPolicy;
use taskdag_test_utils::fake_tools::RecordingToolRunner;

pub use taskdag_test_utils::{init_tracing, with_timeout};

/// Context rooted at `.` over an in-memory filesystem and a recording
/// tool runner. Mock paths must be written as `./...`.
pub fn mock_context(fs: &MockFileSystem, runner: &RecordingToolRunner) -> ActionContext {
    ActionContext::new(".", Arc::new(fs.clone()), Arc::new(runner.clone()))
}

pub fn mock_context_allowing_empty(
    fs: &MockFileSystem,
    runner: &RecordingToolRunner,
) -> ActionContext {
    mock_context(fs, runner).with_empty_globs(EmptyGlobPolicy::Allow)
}

/// A small project: library sources with one foreign file, an example
/// module, and a third-party package.
pub fn sample_project() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("./src/Data/List.purs", "module Data.List where");
    fs.add_file("./src/Data/List.js", "exports.x = 1;");
    fs.add_file("./src/Prelude.purs", "module Prelude where");
    fs.add_file("./example/src/Main.purs", "module Main where");
    fs.add_file(
        "./bower_components/purescript-console/src/Console.purs",
        "module Console where",
    );
    fs.add_file(
        "./bower_components/purescript-console/src/Console.js",
        "exports.log = 1;",
    );
    fs
}
