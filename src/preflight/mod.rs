//! Preflight checks run before any language is processed.
//!
//! Validates that the host has the tools the build flow shells out to, so a
//! batch fails once with a complete list instead of halfway through.
//!
//! # Example
//!
//! ```rust
//! use apertium_builder::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("autoreconf") {
//!     println!("autoconf not installed");
//! }
//!
//! let tools = &[("git", "git"), ("make", "make")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::Result;
use std::path::Path;

use crate::error::{MissingTool, PipelineError};

/// Check if a command resolves to an executable on PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Host tools the Apertium build flow needs.
///
/// Each tuple is (command_name, package_name).
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("git", "git"),
    ("autoreconf", "autoconf"),
    ("make", "make"),
];

/// Check that specific tools are available.
///
/// Returns [`PipelineError::Environment`] listing every missing tool.
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<MissingTool> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .map(|(tool, package)| MissingTool {
            command: tool.to_string(),
            package: package.to_string(),
        })
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::Environment { missing }.into());
    }

    Ok(())
}

/// Fail early when the fallback license is missing.
pub fn check_fallback_license(path: &Path) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(PipelineError::MissingFallbackLicense(path.to_path_buf()).into())
}
