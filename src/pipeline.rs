//! Batch orchestration.
//!
//! Languages are processed one after another. Each one runs
//! acquire → build → harvest → license → metadata and ends in a
//! [`LanguageReport`]; a failing language never stops the ones after it.
//!
//! - An acquisition failure skips the rest of that language.
//! - A build failure is recorded, then harvest, license and metadata still run
//!   against the partial build so the bundle can be inspected.
//! - An empty harvest is a warning only.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::build::build_repository;
use crate::config::{filter_languages, load_config, LanguageSpec};
use crate::harvest::harvest;
use crate::license::copy_license;
use crate::lock::WorkRootLock;
use crate::metadata::{today_utc, write_metadata, LanguageMetadata};
use crate::preflight::{check_fallback_license, check_required_tools};
use crate::process::ProcessRunner;
use crate::repo::{acquire, resolve_revision};

/// Exit code when the language filter selects nothing.
pub const EXIT_NOTHING_SELECTED: u8 = 1;
/// Exit code when at least one language failed.
pub const EXIT_LANGUAGE_FAILED: u8 = 2;

/// Settings shared by every language in a batch.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Per-language bundles go to `<output_root>/<code>/`.
    pub output_root: PathBuf,
    /// Working copies live under `<work_root>/apertium-<code>/`.
    pub work_root: PathBuf,
    /// Recreate working copies from scratch.
    pub clean: bool,
    /// `make -j` worker count.
    pub jobs: usize,
    /// License copied when a repository has none.
    pub fallback_license: PathBuf,
}

/// Pipeline step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    Build,
    Harvest,
    License,
    Metadata,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Acquire => "acquire",
            Stage::Build => "build",
            Stage::Harvest => "harvest",
            Stage::License => "license",
            Stage::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// Outcome of one language.
#[derive(Debug, Clone)]
pub struct LanguageReport {
    pub code: String,
    pub output_dir: PathBuf,
    /// Harvested artifacts, as copied into `output_dir`.
    pub artifacts: Vec<PathBuf>,
    pub failures: Vec<StageFailure>,
}

impl LanguageReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, stage: Stage, err: &anyhow::Error) {
        error!("[{}] {} failed: {:#}", self.code, stage, err);
        self.failures.push(StageFailure {
            stage,
            message: format!("{err:#}"),
        });
    }
}

/// Outcome of every processed language, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub languages: Vec<LanguageReport>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &LanguageReport> {
        self.languages.iter().filter(|r| !r.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        let failed: Vec<&str> = self.failed().map(|r| r.code.as_str()).collect();
        let packaged = self.languages.len() - failed.len();
        if failed.is_empty() {
            format!("Done. {packaged} language(s) packaged.")
        } else {
            format!(
                "Done. {packaged} language(s) packaged, {} failed: {}",
                failed.len(),
                failed.join(", ")
            )
        }
    }
}

/// Result of [`run_batch`].
#[derive(Debug)]
pub enum BatchOutcome {
    /// The filter left no languages to process.
    NothingSelected,
    Completed(BatchReport),
}

impl BatchOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            BatchOutcome::NothingSelected => EXIT_NOTHING_SELECTED,
            BatchOutcome::Completed(report) if report.has_failures() => EXIT_LANGUAGE_FAILED,
            BatchOutcome::Completed(_) => 0,
        }
    }
}

/// Runs the per-language pipeline with a given process runner.
pub struct Pipeline<'a> {
    runner: &'a dyn ProcessRunner,
    options: BuildOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, options: BuildOptions) -> Self {
        Self { runner, options }
    }

    /// Process every spec in order.
    pub fn run(&self, specs: &[LanguageSpec]) -> BatchReport {
        BatchReport {
            languages: specs.iter().map(|s| self.process_language(s)).collect(),
        }
    }

    /// Run all stages for one language, collecting failures instead of
    /// returning early.
    pub fn process_language(&self, spec: &LanguageSpec) -> LanguageReport {
        info!("=== {} ({}) ===", spec.code, spec.name);

        let mut report = LanguageReport {
            code: spec.code.clone(),
            output_dir: self.options.output_root.join(&spec.code),
            artifacts: Vec::new(),
            failures: Vec::new(),
        };

        let repo_dir = match acquire(
            self.runner,
            spec,
            &self.options.work_root,
            self.options.clean,
        ) {
            Ok(dir) => dir,
            Err(e) => {
                report.record(Stage::Acquire, &e);
                return report;
            }
        };

        if let Err(e) = build_repository(self.runner, &repo_dir, self.options.jobs) {
            report.record(Stage::Build, &e);
        }

        match harvest(&repo_dir, &report.output_dir) {
            Ok(artifacts) if artifacts.is_empty() => {
                warn!("no output files found for {}", spec.code);
            }
            Ok(artifacts) => {
                info!("[{}] collected {} artifact(s)", spec.code, artifacts.len());
                report.artifacts = artifacts;
            }
            Err(e) => report.record(Stage::Harvest, &e),
        }

        if let Err(e) = copy_license(&repo_dir, &report.output_dir, &self.options.fallback_license)
        {
            report.record(Stage::License, &e);
        }

        let metadata = LanguageMetadata::new(
            spec,
            resolve_revision(self.runner, &repo_dir),
            today_utc(),
        );
        if let Err(e) = write_metadata(&report.output_dir, &metadata) {
            report.record(Stage::Metadata, &e);
        }

        report
    }
}

/// Load, filter, preflight and process a whole batch.
///
/// Configuration, tool, fallback-license and lock problems are returned as
/// errors before any language is touched. Per-language failures end up in
/// the [`BatchReport`].
pub fn run_batch(
    runner: &dyn ProcessRunner,
    config_path: &Path,
    filter: Option<&str>,
    required_tools: &[(&str, &str)],
    options: BuildOptions,
) -> Result<BatchOutcome> {
    let specs = filter_languages(load_config(config_path)?, filter);
    if specs.is_empty() {
        debug!("language filter {:?} matched nothing", filter);
        return Ok(BatchOutcome::NothingSelected);
    }

    check_required_tools(required_tools)?;
    check_fallback_license(&options.fallback_license)?;

    fs::create_dir_all(&options.output_root).with_context(|| {
        format!(
            "creating output directory '{}'",
            options.output_root.display()
        )
    })?;
    let _lock = WorkRootLock::acquire(&options.work_root)?;

    let report = Pipeline::new(runner, options).run(&specs);
    Ok(BatchOutcome::Completed(report))
}
