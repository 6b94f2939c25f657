// tests/actions.rs

mod common;

use std::path::PathBuf;

use taskdag::action::{
    ActionError, BundleAction, CleanAction, CompileAction, FileSet, PackageAction, ShellAction,
    ValidateAction,
};
use taskdag::exec::ToolOutput;
use taskdag::fs::mock::MockFileSystem;
use taskdag::fs::FileSystem;
use taskdag_test_utils::fake_tools::RecordingToolRunner;

use common::{init_tracing, mock_context, mock_context_allowing_empty, sample_project};

fn library_compile() -> CompileAction {
    CompileAction {
        sources: FileSet::new(["src/**/*.purs"]),
        foreigns: FileSet::new(["src/**/*.js"]),
        output_dir: PathBuf::from("output"),
    }
}

fn with_compiled_output(fs: &MockFileSystem) {
    fs.add_file("./output/Main/index.js", "// main");
    fs.add_file("./output/Data.List/index.js", "// list");
}

#[tokio::test]
async fn compile_passes_sources_foreigns_and_output_dir() -> anyhow::Result<()> {
    init_tracing();
    let fs = sample_project();
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    library_compile().execute(&ctx).await?;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "psc");
    assert_eq!(calls[0].cwd, PathBuf::from("."));
    assert_eq!(
        calls[0].args,
        [
            "src/Data/List.purs",
            "src/Prelude.purs",
            "--ffi",
            "src/Data/List.js",
            "--output",
            "output",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn compile_with_empty_sources_fails_without_running_the_compiler() {
    let fs = MockFileSystem::new();
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    let err = library_compile().execute(&ctx).await.unwrap_err();
    match err.downcast_ref::<ActionError>() {
        Some(ActionError::NoInputFiles { patterns }) => {
            assert_eq!(patterns, &["src/**/*.purs".to_string()]);
        }
        other => panic!("expected NoInputFiles, got {other:?}"),
    }
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn compile_with_empty_sources_runs_when_allowed() -> anyhow::Result<()> {
    let fs = MockFileSystem::new();
    let runner = RecordingToolRunner::new();
    let ctx = mock_context_allowing_empty(&fs, &runner);

    library_compile().execute(&ctx).await?;

    let calls = runner.calls_to("psc");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, ["--output", "output"]);
    Ok(())
}

#[tokio::test]
async fn compiler_failure_carries_status_and_diagnostics() {
    let fs = sample_project();
    let runner = RecordingToolRunner::new();
    runner.fail_program("psc", ToolOutput::failure(1, "Error in module Prelude:\nUnknown type Foo"));
    let ctx = mock_context(&fs, &runner);

    let err = library_compile().execute(&ctx).await.unwrap_err();
    match err.downcast_ref::<ActionError>() {
        Some(ActionError::ToolFailed { command, status, output }) => {
            assert!(command.starts_with("psc "));
            assert_eq!(status, "exit code 1");
            assert!(output.contains("Unknown type Foo"));
        }
        other => panic!("expected ToolFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn configured_tool_arguments_come_first() -> anyhow::Result<()> {
    let fs = sample_project();
    let runner = RecordingToolRunner::new();
    let mut ctx = mock_context(&fs, &runner);
    ctx.tools.compiler = taskdag::config::ToolConfig::new("purs", &["compile"]);

    library_compile().execute(&ctx).await?;

    let calls = runner.calls_to("purs");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args.first().map(String::as_str), Some("compile"));
    Ok(())
}

#[tokio::test]
async fn bundle_names_the_entry_module_and_output() -> anyhow::Result<()> {
    let fs = MockFileSystem::new();
    with_compiled_output(&fs);
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    let bundle = BundleAction {
        artifacts: FileSet::new(["output/**/*.js"]),
        main: "Main".to_string(),
        output: PathBuf::from("bundled.js"),
    };
    bundle.execute(&ctx).await?;

    let calls = runner.calls_to("psc-bundle");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args,
        [
            "output/Data.List/index.js",
            "output/Main/index.js",
            "--module",
            "Main",
            "--main",
            "Main",
            "--output",
            "bundled.js",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn validate_checks_each_file_and_reports_all_failures() {
    init_tracing();
    let fs = MockFileSystem::new();
    with_compiled_output(&fs);
    fs.add_file("./output/Broken/index.js", "function (");
    let runner = RecordingToolRunner::new();
    runner.fail_on_arg(
        "node",
        "output/Broken/index.js",
        ToolOutput::failure(1, "SyntaxError: Unexpected token '('"),
    );
    let ctx = mock_context(&fs, &runner);

    let validate = ValidateAction {
        artifacts: FileSet::new(["output/**/*.js"]),
    };
    let err = validate.execute(&ctx).await.unwrap_err();

    // Every file was checked, one run each.
    let calls = runner.calls_to("node");
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.args.len() == 2 && c.args[0] == "--check"));

    match err.downcast_ref::<ActionError>() {
        Some(ActionError::ValidationFailed { failures, total }) => {
            assert_eq!(*total, 3);
            assert_eq!(failures.len(), 1);
            assert!(failures[0].starts_with("output/Broken/index.js"));
            assert!(failures[0].contains("SyntaxError"));
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn validate_with_no_files_follows_the_empty_glob_policy() {
    let fs = MockFileSystem::new();
    let runner = RecordingToolRunner::new();
    let validate = ValidateAction {
        artifacts: FileSet::new(["output/**/*.js"]),
    };

    let strict = mock_context(&fs, &runner);
    let err = validate.execute(&strict).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ActionError>(),
        Some(ActionError::NoInputFiles { .. })
    ));

    let lenient = mock_context_allowing_empty(&fs, &runner);
    validate
        .execute(&lenient)
        .await
        .expect("nothing to validate is fine when allowed");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn package_requires_its_input_artifact() {
    let fs = MockFileSystem::new();
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    let package = PackageAction {
        input: PathBuf::from("bundled.js"),
        filename: "example.js".to_string(),
        dest: PathBuf::from("example"),
        modules_directories: vec!["node_modules".to_string()],
    };

    let err = package.execute(&ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ActionError>(),
        Some(ActionError::MissingInput(path)) if path == &PathBuf::from("bundled.js")
    ));
    assert!(runner.calls().is_empty());

    fs.add_file("./bundled.js", "// bundle");
    package.execute(&ctx).await.expect("input now exists");

    let calls = runner.calls_to("webpack");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args,
        [
            "--entry",
            "./bundled.js",
            "--output-path",
            "example",
            "--output-filename",
            "example.js",
            "--resolve-modules",
            "node_modules",
        ]
    );
}

#[tokio::test]
async fn clean_removes_the_tree_and_is_idempotent() -> anyhow::Result<()> {
    let fs = MockFileSystem::new();
    with_compiled_output(&fs);
    fs.add_file("./src/Main.purs", "module Main where");
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);
    let clean = CleanAction::new("output");

    clean.execute(&ctx).await?;
    assert!(!fs.exists(&PathBuf::from("./output")));
    assert!(!fs.exists(&PathBuf::from("./output/Main/index.js")));
    assert!(fs.is_file(&PathBuf::from("./src/Main.purs")));

    // Already absent: still a success.
    clean.execute(&ctx).await?;
    Ok(())
}

#[tokio::test]
async fn clean_fails_when_the_target_is_not_a_directory() {
    let fs = MockFileSystem::new();
    fs.add_file("./output", "not a directory");
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    let err = CleanAction::new("output").execute(&ctx).await.unwrap_err();
    assert!(format!("{err:#}").contains("removing"));
    assert!(fs.is_file(&PathBuf::from("./output")));
}

#[tokio::test]
async fn clean_only_removes_directories_below_the_root() {
    let fs = MockFileSystem::new();
    with_compiled_output(&fs);
    fs.add_file("./src/Main.purs", "module Main where");
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    for target in ["/", ".", "output/../..", "../output"] {
        let err = CleanAction::new(target).execute(&ctx).await.unwrap_err();
        assert!(
            matches!(err.downcast_ref::<ActionError>(), Some(ActionError::UnsafeCleanTarget(_))),
            "{target}: {err:#}"
        );
    }
    assert!(fs.is_file(&PathBuf::from("./output/Main/index.js")));
    assert!(fs.is_file(&PathBuf::from("./src/Main.purs")));
}

#[cfg(unix)]
#[tokio::test]
async fn shell_runs_through_sh_in_the_project_root() -> anyhow::Result<()> {
    let fs = MockFileSystem::new();
    let runner = RecordingToolRunner::new();
    let ctx = mock_context(&fs, &runner);

    ShellAction::new("eslint output").execute(&ctx).await?;

    let calls = runner.calls_to("sh");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, ["-c", "eslint output"]);
    assert_eq!(calls[0].cwd, PathBuf::from("."));
    Ok(())
}
