//! Batch compiler for Apertium language repositories.
//!
//! Given a list of language entries, each pointing at an Apertium language
//! repository, this crate clones (or reuses) every repository, runs its
//! autotools build, harvests the compiled transducers and constraint-grammar
//! binaries, and packages them with a license and a provenance descriptor.
//!
//! - **Configuration** - JSON language list ([`config`])
//! - **Preflight checks** - Host tool and fallback-license validation ([`preflight`])
//! - **Process execution** - `Cmd` + [`process::ProcessRunner`] seam over external tools
//! - **Pipeline stages** - [`repo`], [`build`], [`harvest`], [`license`], [`metadata`]
//! - **Orchestration** - Per-language isolation and batch reporting ([`pipeline`])
//!
//! # Output layout
//!
//! ```text
//! <work-root>/apertium-<code>/     working copy, reused between runs
//! <output-root>/<code>/
//!     *.automorf.hfst *.autogen.hfst *.rlx.bin *.rlx
//!     LICENSE
//!     metadata.json
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use apertium_builder::pipeline::{run_batch, BuildOptions};
//! use apertium_builder::preflight::REQUIRED_TOOLS;
//! use apertium_builder::process::SystemRunner;
//!
//! let options = BuildOptions {
//!     output_root: "dist".into(),
//!     work_root: "build".into(),
//!     clean: false,
//!     jobs: 4,
//!     fallback_license: "LICENSE".into(),
//! };
//! let outcome = run_batch(&SystemRunner, "languages.json".as_ref(), Some("kaz"), REQUIRED_TOOLS, options)?;
//! std::process::exit(outcome.exit_code().into());
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod harvest;
pub mod license;
pub mod lock;
pub mod metadata;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod repo;

pub use config::LanguageSpec;
pub use error::PipelineError;
pub use pipeline::{run_batch, BatchOutcome, BatchReport, BuildOptions, LanguageReport, Pipeline};
