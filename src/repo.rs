//! Working-copy acquisition.
//!
//! Each language gets one working copy at `<work-root>/apertium-<code>`. It is
//! cloned once (shallow) and reused by later runs as a build cache; `clean`
//! throws it away first.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::LanguageSpec;
use crate::process::{run_checked, Cmd, ProcessRunner};

/// Directory holding the working copy for `code` under `work_root`.
pub fn working_copy_dir(work_root: &Path, code: &str) -> PathBuf {
    work_root.join(format!("apertium-{code}"))
}

/// Return a ready working copy for `spec`, cloning it if needed.
///
/// With `spec.git_ref` set, the revision is checked out on every call, so a
/// reused working copy can be re-pinned.
pub fn acquire(
    runner: &dyn ProcessRunner,
    spec: &LanguageSpec,
    work_root: &Path,
    clean: bool,
) -> Result<PathBuf> {
    let repo_dir = working_copy_dir(work_root, &spec.code);

    if clean && repo_dir.exists() {
        info!("removing working copy {}", repo_dir.display());
        fs::remove_dir_all(&repo_dir).with_context(|| {
            format!("removing working copy '{}'", repo_dir.display())
        })?;
    }

    if repo_dir.exists() {
        debug!("reusing working copy {}", repo_dir.display());
    } else {
        run_checked(
            runner,
            &Cmd::new("git")
                .args(["clone", "--depth", "1", spec.repo.as_str()])
                .arg(repo_dir.to_string_lossy()),
        )
        .with_context(|| format!("cloning '{}' for '{}'", spec.repo, spec.code))?;
    }

    if let Some(git_ref) = &spec.git_ref {
        run_checked(
            runner,
            &Cmd::new("git")
                .args(["checkout", git_ref.as_str()])
                .current_dir(&repo_dir),
        )
        .with_context(|| format!("checking out '{}' for '{}'", git_ref, spec.code))?;
    }

    Ok(repo_dir)
}

/// Current revision of the working copy, or an empty string if it can't be
/// determined.
pub fn resolve_revision(runner: &dyn ProcessRunner, repo_dir: &Path) -> String {
    let cmd = Cmd::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo_dir)
        .capture();

    match runner.run(&cmd) {
        Ok(output) if output.is_success() => output.stdout.trim().to_string(),
        Ok(output) => {
            debug!(
                "revision lookup in {} exited with {:?}",
                repo_dir.display(),
                output.code
            );
            String::new()
        }
        Err(e) => {
            debug!("revision lookup in {} failed: {}", repo_dir.display(), e);
            String::new()
        }
    }
}
