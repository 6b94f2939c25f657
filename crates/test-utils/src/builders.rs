#![allow(dead_code)]

use std::collections::BTreeMap;
use taskdag::action::{Action, ShellAction};
use taskdag::config::{
    ActionConfig, ConfigFile, ConfigSection, PipelineSection, RawConfigFile, TaskConfig,
    ToolsSection,
};
use taskdag::dag::TaskGraph;
use taskdag::types::EmptyGlobPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                pipeline: PipelineSection::default(),
                tools: ToolsSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn without_builtin_pipeline(mut self) -> Self {
        self.config.config.builtin_pipeline = false;
        self
    }

    pub fn with_empty_globs(mut self, policy: EmptyGlobPolicy) -> Self {
        self.config.config.empty_globs = policy;
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.config.pipeline.output_dir = dir.to_string();
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn shell(cmd: &str) -> Self {
        Self::new().action(ActionConfig::Shell {
            cmd: cmd.to_string(),
        })
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn action(mut self, action: ActionConfig) -> Self {
        self.task.action = Some(action);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a graph of shell tasks from `(name, prerequisites)` pairs.
///
/// Each task runs `echo <name>`; with a fake executor nothing is spawned.
pub fn shell_graph(tasks: &[(&str, &[&str])]) -> TaskGraph {
    let mut builder = TaskGraph::builder();
    for (name, deps) in tasks {
        builder
            .register(
                *name,
                deps.iter().copied(),
                Some(Action::Shell(ShellAction::new(format!("echo {name}")))),
            )
            .expect("duplicate task in test graph");
    }
    builder.build().expect("invalid test graph")
}

/// The scenario graph from the pipeline: same names and edges as the
/// built-in tasks.
pub fn pipeline_shape_graph() -> TaskGraph {
    shell_graph(&[
        ("make", &[]),
        ("jsvalidate", &["make"]),
        ("example-make", &[]),
        ("example-bundle", &["example-make"]),
        ("example", &["example-bundle"]),
        ("default", &["jsvalidate", "example"]),
    ])
}
