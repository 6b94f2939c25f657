// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// What to do when a glob-driven action resolves its primary inputs to zero
/// files.
///
/// - `Error`: fail the task with `NoInputFiles` without invoking the tool
///   (default behaviour).
/// - `Allow`: carry on; compile/bundle still invoke their tool with no
///   inputs, validate succeeds trivially.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyGlobPolicy {
    #[default]
    Error,
    Allow,
}

impl FromStr for EmptyGlobPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(EmptyGlobPolicy::Error),
            "allow" => Ok(EmptyGlobPolicy::Allow),
            other => Err(format!(
                "invalid empty_globs: {other} (expected \"error\" or \"allow\")"
            )),
        }
    }
}
