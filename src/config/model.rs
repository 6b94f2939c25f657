// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::EmptyGlobPolicy;

/// Top-level pipeline file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// empty_globs = "error"
///
/// [pipeline]
/// output_dir = "output"
/// bundle_main = "Main"
///
/// [tools]
/// validator = { program = "node", args = ["--check"] }
///
/// [task.lint]
/// after = ["make"]
/// action = { kind = "shell", cmd = "eslint output" }
/// ```
///
/// All sections are optional and have defaults matching the built-in
/// pipeline.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub tools: ToolsSection,

    /// Extra tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    pipeline: PipelineSection,
    tools: ToolsSection,
    task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        pipeline: PipelineSection,
        tools: ToolsSection,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self {
            config,
            pipeline,
            tools,
            task,
        }
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn pipeline(&self) -> &PipelineSection {
        &self.pipeline
    }

    pub fn tools(&self) -> &ToolsSection {
        &self.tools
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }
}

impl Default for ConfigFile {
    /// The built-in pipeline with built-in settings.
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.config, raw.pipeline, raw.tools, raw.task)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// `"error"` (default) or `"allow"`.
    #[serde(default)]
    pub empty_globs: EmptyGlobPolicy,

    /// Register the built-in tasks (`clean`, `make`, `example-make`,
    /// `example-bundle`, `example`, `jsvalidate`, `default`).
    #[serde(default = "default_true")]
    pub builtin_pipeline: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            empty_globs: EmptyGlobPolicy::default(),
            builtin_pipeline: true,
        }
    }
}

/// `[pipeline]` section: the static lists and names the built-in tasks use.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    /// Library sources.
    pub sources: Vec<String>,
    /// Foreign (FFI) files accompanying the library sources.
    pub foreigns: Vec<String>,
    pub example_sources: Vec<String>,
    pub example_foreigns: Vec<String>,
    /// Compiler output directory; also what `clean` removes.
    pub output_dir: String,
    /// Entry module for the bundle.
    pub bundle_main: String,
    pub bundle_output: String,
    pub package_filename: String,
    /// Directory the packaged file is written into.
    pub package_dest: String,
    /// Module resolution search directories for the packager.
    pub modules_directories: Vec<String>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            sources: strings(&[
                "src/**/*.purs",
                "bower_components/purescript-*/src/**/*.purs",
            ]),
            foreigns: strings(&[
                "src/**/*.js",
                "bower_components/purescript-*/src/**/*.js",
            ]),
            example_sources: strings(&["example/src/**/*.purs"]),
            example_foreigns: strings(&["example/src/**/*.js"]),
            output_dir: "output".to_string(),
            bundle_main: "Main".to_string(),
            bundle_output: "bundled.js".to_string(),
            package_filename: "example.js".to_string(),
            package_dest: "example".to_string(),
            modules_directories: strings(&["node_modules"]),
        }
    }
}

impl PipelineSection {
    /// Glob matching every compiled JavaScript file under `output_dir`.
    pub fn compiled_js_glob(&self) -> String {
        format!("{}/**/*.js", self.output_dir.trim_end_matches('/'))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// An external program plus leading arguments.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolConfig {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: strings(args),
        }
    }
}

/// `[tools]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    pub compiler: ToolConfig,
    pub bundler: ToolConfig,
    pub validator: ToolConfig,
    pub packager: ToolConfig,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            compiler: ToolConfig::new("psc", &[]),
            bundler: ToolConfig::new("psc-bundle", &[]),
            validator: ToolConfig::new("node", &["--check"]),
            packager: ToolConfig::new("webpack", &[]),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Prerequisites: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// What the task does. A task without an action only groups its
    /// prerequisites.
    #[serde(default)]
    pub action: Option<ActionConfig>,
}

/// `action = { kind = "...", ... }` of a config task.
///
/// Relative paths are resolved against the project root. Fields left out
/// fall back to the `[pipeline]` values where one exists.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionConfig {
    Clean {
        #[serde(default)]
        dir: Option<String>,
    },
    Compile {
        src: Vec<String>,
        #[serde(default)]
        ffi: Vec<String>,
        #[serde(default)]
        output: Option<String>,
    },
    Bundle {
        #[serde(default)]
        src: Option<String>,
        #[serde(default)]
        main: Option<String>,
        #[serde(default)]
        output: Option<String>,
    },
    Validate {
        #[serde(default)]
        src: Option<String>,
    },
    Package {
        #[serde(default)]
        input: Option<String>,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        dest: Option<String>,
        #[serde(default)]
        modules_directories: Option<Vec<String>>,
    },
    Shell {
        cmd: String,
    },
}
