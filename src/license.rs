//! License resolution for packaged languages.
//!
//! Each output bundle ships exactly one `LICENSE`. It comes from the
//! repository root when one of the conventional names exists there, otherwise
//! from the project-wide fallback.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::harvest::copy_preserving_mtime;

/// License file names looked up in the working copy root, highest priority
/// first.
pub const LICENSE_CANDIDATES: &[&str] = &["COPYING", "LICENSE", "COPYING.LESSER", "COPYING.GPL"];

/// Name of the license file inside an output bundle.
pub const LICENSE_FILENAME: &str = "LICENSE";

/// First license candidate present in `repo_dir`, if any.
pub fn find_license(repo_dir: &Path) -> Option<PathBuf> {
    LICENSE_CANDIDATES
        .iter()
        .map(|name| repo_dir.join(name))
        .find(|path| path.is_file())
}

/// Copy the repository's license, or `fallback`, to `out_dir/LICENSE`.
///
/// Returns the path of the license that was used.
pub fn copy_license(repo_dir: &Path, out_dir: &Path, fallback: &Path) -> Result<PathBuf> {
    let source = match find_license(repo_dir) {
        Some(path) => path,
        None => {
            debug!(
                "no license in {}, using fallback {}",
                repo_dir.display(),
                fallback.display()
            );
            fallback.to_path_buf()
        }
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory '{}'", out_dir.display()))?;
    copy_preserving_mtime(&source, &out_dir.join(LICENSE_FILENAME))?;
    Ok(source)
}
