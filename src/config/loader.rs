// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskdagError};

/// Load a pipeline file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a pipeline file from path and run field-level validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Decide which configuration to run with.
///
/// - An explicit path must exist and is loaded.
/// - Without one, `Taskdag.toml` in the current directory is loaded if it
///   exists.
/// - Otherwise the built-in pipeline with built-in settings is used.
///
/// Returns the config together with the path it came from, if any.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(ConfigFile, Option<PathBuf>)> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(TaskdagError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        info!(path = %path.display(), "loading pipeline file");
        return Ok((load_and_validate(path)?, Some(path.to_path_buf())));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        info!(path = %default_path.display(), "loading pipeline file");
        let cfg = load_and_validate(&default_path)?;
        return Ok((cfg, Some(default_path)));
    }

    debug!("no pipeline file found; using built-in pipeline settings");
    Ok((ConfigFile::default(), None))
}

/// `Taskdag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskdag.toml")
}
