//! apertium-builder CLI.
//!
//! Usage:
//! ```bash
//! apertium-builder --config languages.json --out dist --work build
//! apertium-builder --langs kaz,tur --clean
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use apertium_builder::build::job_count;
use apertium_builder::pipeline::{run_batch, BatchOutcome, BuildOptions};
use apertium_builder::preflight::REQUIRED_TOOLS;
use apertium_builder::process::SystemRunner;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Compile Apertium language repositories and package their artifacts
#[derive(Parser)]
#[command(name = "apertium-builder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the language config JSON
    #[arg(long, default_value = "languages.json")]
    config: PathBuf,

    /// Output directory; one subdirectory per language
    #[arg(long, default_value = "dist")]
    out: PathBuf,

    /// Work directory holding cloned repositories
    #[arg(long, default_value = "build")]
    work: PathBuf,

    /// Comma-separated language codes to build (default: all)
    #[arg(long)]
    langs: Option<String>,

    /// Re-clone repositories before building
    #[arg(long)]
    clean: bool,

    /// License copied when a repository ships none
    #[arg(long, default_value = "LICENSE")]
    fallback_license: PathBuf,

    /// Parallel make jobs (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let options = BuildOptions {
        output_root: cli.out,
        work_root: cli.work,
        clean: cli.clean,
        jobs: job_count(cli.jobs),
        fallback_license: cli.fallback_license,
    };

    let outcome = run_batch(
        &SystemRunner,
        &cli.config,
        cli.langs.as_deref(),
        REQUIRED_TOOLS,
        options,
    )?;

    match &outcome {
        BatchOutcome::NothingSelected => println!("No languages selected."),
        BatchOutcome::Completed(report) => {
            for failed in report.failed() {
                for failure in &failed.failures {
                    eprintln!("  {} [{}]: {}", failed.code, failure.stage, failure.message);
                }
            }
            println!("{}", report.summary());
        }
    }

    Ok(ExitCode::from(outcome.exit_code()))
}
