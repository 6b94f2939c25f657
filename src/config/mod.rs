// src/config/mod.rs

//! Configuration loading and validation for taskdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a pipeline file from disk, or fall back to built-in settings (`loader.rs`).
//! - Validate field-level invariants (`validate.rs`). Graph invariants
//!   (prerequisites, cycles) are checked when the task graph is built.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{
    ActionConfig, ConfigFile, ConfigSection, PipelineSection, RawConfigFile, TaskConfig,
    ToolConfig, ToolsSection,
};
