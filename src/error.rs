//! Error taxonomy for the build pipeline.
//!
//! Functions in this crate return `anyhow::Result` and attach context as they
//! go. The variants below are the root causes callers care about; reach them
//! with `err.downcast_ref::<PipelineError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or incomplete language configuration.
    #[error("invalid configuration '{}': {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// Required host tools are not on PATH. Lists every missing tool.
    #[error("Missing required host tools:\n{}", format_missing(.missing))]
    Environment { missing: Vec<MissingTool> },

    /// An external command exited non-zero or could not be spawned.
    #[error("command `{command}` failed ({})", describe_exit(.code, .detail))]
    Process {
        command: String,
        code: Option<i32>,
        detail: String,
    },

    /// The project-wide fallback license does not exist.
    #[error("missing fallback LICENSE at {}", .0.display())]
    MissingFallbackLicense(PathBuf),
}

/// A required tool that could not be resolved, with the package providing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub command: String,
    pub package: String,
}

impl PipelineError {
    pub(crate) fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn format_missing(missing: &[MissingTool]) -> String {
    missing
        .iter()
        .map(|t| format!("  {} (install: {})", t.command, t.package))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_exit(code: &Option<i32>, detail: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    };
    let detail = detail.trim();
    if detail.is_empty() {
        status
    } else {
        format!("{status}: {detail}")
    }
}
