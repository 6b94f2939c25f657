// src/config/validate.rs

use std::path::Path;

use crate::action::clean::is_below_root;
use crate::config::model::{ActionConfig, ConfigFile, RawConfigFile, ToolConfig};
use crate::errors::{Result, TaskdagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TaskdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.config,
            raw.pipeline,
            raw.tools,
            raw.task,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_pipeline(cfg)?;
    validate_tools(cfg)?;
    validate_tasks(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> TaskdagError {
    TaskdagError::ConfigError(msg.into())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.config.builtin_pipeline && cfg.task.is_empty() {
        return Err(config_error(
            "builtin_pipeline = false requires at least one [task.<name>] section",
        ));
    }
    Ok(())
}

fn validate_pipeline(cfg: &RawConfigFile) -> Result<()> {
    let p = &cfg.pipeline;
    let required = [
        ("output_dir", &p.output_dir),
        ("bundle_main", &p.bundle_main),
        ("bundle_output", &p.bundle_output),
        ("package_filename", &p.package_filename),
        ("package_dest", &p.package_dest),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(config_error(format!("[pipeline].{field} must not be empty")));
        }
    }
    if cfg.config.builtin_pipeline && p.sources.is_empty() {
        return Err(config_error(
            "[pipeline].sources must list at least one pattern",
        ));
    }
    ensure_removable_dir("[pipeline].output_dir", &p.output_dir)?;

    let pattern_lists = [
        ("sources", &p.sources),
        ("foreigns", &p.foreigns),
        ("example_sources", &p.example_sources),
        ("example_foreigns", &p.example_foreigns),
    ];
    for (field, patterns) in pattern_lists {
        ensure_relative_patterns(&format!("[pipeline].{field}"), patterns)?;
    }
    Ok(())
}

/// `clean` deletes this directory, so it must lie strictly inside the
/// project root.
fn ensure_removable_dir(field: &str, dir: &str) -> Result<()> {
    if !is_below_root(Path::new(dir)) {
        return Err(config_error(format!(
            "{field} = {dir:?} must be a relative path below the project root (no `..`, not `.`)"
        )));
    }
    Ok(())
}

/// Globs are resolved against the project root.
fn ensure_relative_patterns(field: &str, patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        let path = pattern.strip_prefix('!').unwrap_or(pattern);
        if Path::new(path).has_root() {
            return Err(config_error(format!(
                "{field}: pattern {pattern:?} must be relative to the project root"
            )));
        }
    }
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools: [(&str, &ToolConfig); 4] = [
        ("compiler", &cfg.tools.compiler),
        ("bundler", &cfg.tools.bundler),
        ("validator", &cfg.tools.validator),
        ("packager", &cfg.tools.packager),
    ];
    for (name, tool) in tools {
        if tool.program.trim().is_empty() {
            return Err(config_error(format!("[tools].{name}.program must not be empty")));
        }
    }
    Ok(())
}

fn validate_tasks(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if name.trim().is_empty() {
            return Err(config_error("task names must not be empty"));
        }
        if task.after.iter().any(|dep| dep.trim().is_empty()) {
            return Err(config_error(format!(
                "task '{name}' has an empty name in `after`"
            )));
        }
        if let Some(action) = &task.action {
            validate_action(name, action)?;
        }
    }
    Ok(())
}

fn validate_action(task: &str, action: &ActionConfig) -> Result<()> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());

    match action {
        ActionConfig::Clean { dir } => {
            if blank(dir) {
                return Err(config_error(format!("task '{task}': clean `dir` is empty")));
            }
            if let Some(dir) = dir {
                ensure_removable_dir(&format!("task '{task}': clean `dir`"), dir)?;
            }
        }
        ActionConfig::Compile { src, ffi, output } => {
            ensure_relative_patterns(&format!("task '{task}': compile `src`"), src)?;
            ensure_relative_patterns(&format!("task '{task}': compile `ffi`"), ffi)?;
            if src.is_empty() {
                return Err(config_error(format!(
                    "task '{task}': compile needs at least one `src` pattern"
                )));
            }
            if blank(output) {
                return Err(config_error(format!("task '{task}': compile `output` is empty")));
            }
        }
        ActionConfig::Bundle { src, main, output } => {
            if blank(src) || blank(main) || blank(output) {
                return Err(config_error(format!(
                    "task '{task}': bundle `src`, `main` and `output` must not be empty"
                )));
            }
            ensure_relative_patterns(
                &format!("task '{task}': bundle `src`"),
                src.as_slice(),
            )?;
        }
        ActionConfig::Validate { src } => {
            if blank(src) {
                return Err(config_error(format!("task '{task}': validate `src` is empty")));
            }
            ensure_relative_patterns(
                &format!("task '{task}': validate `src`"),
                src.as_slice(),
            )?;
        }
        ActionConfig::Package {
            input,
            filename,
            dest,
            ..
        } => {
            if blank(input) || blank(filename) || blank(dest) {
                return Err(config_error(format!(
                    "task '{task}': package `input`, `filename` and `dest` must not be empty"
                )));
            }
        }
        ActionConfig::Shell { cmd } => {
            if cmd.trim().is_empty() {
                return Err(config_error(format!("task '{task}': shell `cmd` is empty")));
            }
        }
    }
    Ok(())
}
