//! Provenance descriptor written next to the harvested artifacts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

use crate::config::LanguageSpec;

/// License identifier recorded for every packaged language.
pub const LICENSE_ID: &str = "GPL-3.0-or-later";

/// File name of the descriptor inside an output bundle.
pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageMetadata {
    pub lang: String,
    pub name: String,
    pub script: String,
    pub quality: String,
    pub source: String,
    /// Resolved revision; empty when it couldn't be determined.
    pub commit: String,
    /// UTC date of compilation, `YYYY-MM-DD`.
    pub compiled_date: String,
    pub license: String,
}

impl LanguageMetadata {
    pub fn new(spec: &LanguageSpec, commit: String, compiled_date: String) -> Self {
        Self {
            lang: spec.code.clone(),
            name: spec.name.clone(),
            script: spec.script.clone(),
            quality: spec.quality.clone(),
            source: spec.repo.clone(),
            commit,
            compiled_date,
            license: LICENSE_ID.to_string(),
        }
    }
}

/// Today's date in UTC as `YYYY-MM-DD`.
pub fn today_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02}",
        now.year(),
        now.month() as u8,
        now.day()
    )
}

/// Write `metadata` to `out_dir/metadata.json`, replacing any previous one.
pub fn write_metadata(out_dir: &Path, metadata: &LanguageMetadata) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory '{}'", out_dir.display()))?;

    let path = out_dir.join(METADATA_FILENAME);
    let mut json = serde_json::to_string_pretty(metadata).context("serializing metadata")?;
    json.push('\n');
    fs::write(&path, json).with_context(|| format!("writing metadata '{}'", path.display()))?;
    Ok(path)
}
