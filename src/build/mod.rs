//! Native autotools build of a working copy.
//!
//! The sequence mirrors what Apertium language repositories document:
//!
//! ```text
//! autoreconf -fi      (falls back to ./autogen.sh)
//! ./configure
//! make -j <jobs>
//! ```
//!
//! Nothing is retried. A failed step leaves whatever partial build state it
//! produced in the working copy.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use crate::process::{run_checked, Cmd, ProcessRunner};

/// Worker count used when CPU parallelism can't be detected.
pub const DEFAULT_JOBS: usize = 2;

/// Number of `make` workers: the override if given, else the CPU count.
pub fn job_count(requested: Option<usize>) -> usize {
    if let Some(jobs) = requested.filter(|&n| n > 0) {
        return jobs;
    }
    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!(
                "could not detect CPU count ({}), using {} jobs",
                e, DEFAULT_JOBS
            );
            DEFAULT_JOBS
        }
    }
}

/// Run bootstrap, configure and make inside `repo_dir`.
pub fn build_repository(runner: &dyn ProcessRunner, repo_dir: &Path, jobs: usize) -> Result<()> {
    bootstrap(runner, repo_dir)?;

    run_checked(runner, &Cmd::new("./configure").current_dir(repo_dir))
        .with_context(|| format!("configuring '{}'", repo_dir.display()))?;

    run_checked(
        runner,
        &Cmd::new("make")
            .arg("-j")
            .arg(jobs.to_string())
            .current_dir(repo_dir),
    )
    .with_context(|| format!("building '{}'", repo_dir.display()))?;

    Ok(())
}

/// Generate `configure`. `autoreconf` is preferred; repositories that need
/// extra setup ship an `autogen.sh` which is tried when it fails.
fn bootstrap(runner: &dyn ProcessRunner, repo_dir: &Path) -> Result<()> {
    let primary = Cmd::new("autoreconf").arg("-fi").current_dir(repo_dir);
    if let Err(e) = run_checked(runner, &primary) {
        warn!("{:#}; falling back to ./autogen.sh", e);
        run_checked(runner, &Cmd::new("./autogen.sh").current_dir(repo_dir))
            .with_context(|| format!("bootstrapping '{}'", repo_dir.display()))?;
    }
    Ok(())
}
