//! Language configuration loading.
//!
//! The configuration is a JSON document with a top-level `languages` array:
//!
//! ```json
//! {
//!   "languages": [
//!     { "code": "kaz", "name": "Kazakh", "repo": "https://github.com/apertium/apertium-kaz",
//!       "script": "Cyrl", "quality": "production", "ref": "v1.2.0" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Quality tier recorded when an entry doesn't specify one.
pub const DEFAULT_QUALITY: &str = "unknown";

/// One language entry, validated and immutable after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Short identifier, used verbatim as a directory name.
    pub code: String,
    pub name: String,
    /// Repository location passed to `git clone`.
    pub repo: String,
    /// Writing-system tag (e.g. `Latn`, `Cyrl`).
    pub script: String,
    pub quality: String,
    /// Pinned revision. `None` builds the default branch tip.
    pub git_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    languages: Vec<LanguageEntry>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: Option<String>,
    name: Option<String>,
    repo: Option<String>,
    script: Option<String>,
    quality: Option<String>,
    #[serde(rename = "ref")]
    git_ref: Option<String>,
}

/// Load all language entries from `path`, in declaration order.
pub fn load_config(path: &Path) -> Result<Vec<LanguageSpec>> {
    let bytes = fs::read(path)
        .map_err(|e| PipelineError::config(path, format!("cannot read file: {e}")))
        .with_context(|| format!("loading language config '{}'", path.display()))?;
    parse_config(path, &bytes)
}

/// Parse configuration bytes. `path` is only used in error messages.
pub fn parse_config(path: &Path, bytes: &[u8]) -> Result<Vec<LanguageSpec>> {
    let file: ConfigFile = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::config(path, format!("malformed JSON: {e}")))?;

    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(file.languages.len());
    for (index, entry) in file.languages.into_iter().enumerate() {
        let spec = entry_to_spec(path, index, entry)?;
        if !seen.insert(spec.code.clone()) {
            return Err(PipelineError::config(
                path,
                format!("languages[{index}]: duplicate code '{}'", spec.code),
            )
            .into());
        }
        specs.push(spec);
    }
    Ok(specs)
}

fn entry_to_spec(path: &Path, index: usize, entry: LanguageEntry) -> Result<LanguageSpec> {
    let required = |value: Option<String>, field: &str| {
        value.ok_or_else(|| {
            PipelineError::config(
                path,
                format!("languages[{index}]: missing required field '{field}'"),
            )
        })
    };

    let code = required(entry.code, "code")?;
    let repo = required(entry.repo, "repo")?;
    let script = required(entry.script, "script")?;
    validate_code(path, index, &code)?;

    Ok(LanguageSpec {
        name: entry.name.unwrap_or_else(|| code.clone()),
        quality: entry
            .quality
            .unwrap_or_else(|| DEFAULT_QUALITY.to_string()),
        git_ref: entry.git_ref.filter(|r| !r.trim().is_empty()),
        code,
        repo,
        script,
    })
}

fn validate_code(path: &Path, index: usize, code: &str) -> Result<(), PipelineError> {
    let reason = if code.is_empty() {
        "code must not be empty"
    } else if code == "." || code == ".." {
        "code must not be '.' or '..'"
    } else if code.contains('/') || code.contains('\\') {
        "code must not contain path separators"
    } else {
        return Ok(());
    };
    Err(PipelineError::config(
        path,
        format!("languages[{index}]: {reason} (got '{code}')"),
    ))
}

/// Keep only the specs whose code appears in the comma-separated `filter`.
///
/// Blank items are ignored; a missing or blank filter selects everything.
pub fn filter_languages(specs: Vec<LanguageSpec>, filter: Option<&str>) -> Vec<LanguageSpec> {
    let wanted: HashSet<&str> = filter
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect();

    if wanted.is_empty() {
        return specs;
    }
    specs
        .into_iter()
        .filter(|spec| wanted.contains(spec.code.as_str()))
        .collect()
}
