//! Artifact discovery and collection.
//!
//! Compiled artifacts are recognized by file name only; their contents are
//! never inspected. Matches are copied flat into the language's output
//! directory, keeping only the base name.

use anyhow::{Context, Result};
use glob::Pattern;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name patterns of compiled artifacts, in collection order.
pub const ARTIFACT_PATTERNS: &[&str] = &[
    "*.automorf.hfst",
    "*.autogen.hfst",
    "*.rlx.bin",
    "*.rlx",
];

/// Find every file under `root` whose base name matches one of `patterns`.
///
/// Results are grouped by pattern, in the order given, and sorted by path
/// within each group. A file matching several patterns is listed once per
/// pattern.
pub fn find_artifacts(root: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let compiled = patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid artifact pattern '{p}'")))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry =
            entry.with_context(|| format!("walking working copy '{}'", root.display()))?;
        // Symlinked artifacts count when they resolve to a regular file.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file {
            files.push(entry.into_path());
        }
    }
    files.sort();

    let mut found = Vec::new();
    for pattern in &compiled {
        for path in &files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if pattern.matches(name) {
                found.push(path.clone());
            }
        }
    }
    Ok(found)
}

/// Copy every recognized artifact in `repo_dir` into `out_dir`.
///
/// Returns the destination paths in copy order. Files with the same base name
/// overwrite each other; the last one copied wins.
pub fn harvest(repo_dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory '{}'", out_dir.display()))?;

    let mut copied = Vec::new();
    for src in find_artifacts(repo_dir, ARTIFACT_PATTERNS)? {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = out_dir.join(name);
        copy_preserving_mtime(&src, &dst)?;
        debug!("collected {} -> {}", src.display(), dst.display());
        copied.push(dst);
    }
    Ok(copied)
}

/// Copy a file with its permissions and modification time.
///
/// Symlinks are followed. An existing `dst` is replaced even when read-only.
pub(crate) fn copy_preserving_mtime(src: &Path, dst: &Path) -> Result<()> {
    if dst.is_symlink() || dst.is_file() {
        fs::remove_file(dst)
            .with_context(|| format!("Failed to remove {}", dst.display()))?;
    }
    fs::copy(src, dst).with_context(|| {
        format!("Failed to copy {} to {}", src.display(), dst.display())
    })?;

    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .with_context(|| format!("reading modification time of {}", src.display()))?;
    // The copy carries the source's permissions, so it may be read-only.
    File::open(dst)
        .and_then(|f| f.set_modified(modified))
        .with_context(|| format!("setting modification time of {}", dst.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_find_artifacts_matches_only_patterns() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "kaz.automorf.hfst");
        touch(root, "sub/kaz.autogen.hfst");
        touch(root, "kaz.rlx.bin");
        touch(root, "deep/er/kaz.rlx");
        touch(root, "kaz.automorf.att");
        touch(root, "kaz.rlx.txt");
        touch(root, "Makefile");

        let found = find_artifacts(root, ARTIFACT_PATTERNS).unwrap();
        assert_eq!(
            names(&found),
            vec![
                "kaz.automorf.hfst",
                "kaz.autogen.hfst",
                "kaz.rlx.bin",
                "kaz.rlx"
            ]
        );
    }

    #[test]
    fn test_find_artifacts_groups_by_pattern_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "a.rlx");
        touch(root, "b.automorf.hfst");
        touch(root, "a.automorf.hfst");

        let found = find_artifacts(root, &["*.automorf.hfst", "*.rlx"]).unwrap();
        assert_eq!(
            names(&found),
            vec!["a.automorf.hfst", "b.automorf.hfst", "a.rlx"]
        );
    }

    #[test]
    fn test_find_artifacts_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        assert!(find_artifacts(temp.path(), &["[unclosed"]).is_err());
    }

    #[test]
    fn test_harvest_flattens_into_output() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let out = temp.path().join("dist/kaz");
        touch(&repo, "kaz.automorf.hfst");
        touch(&repo, "nested/dir/kaz-tur.autogen.hfst");

        let copied = harvest(&repo, &out).unwrap();

        assert_eq!(
            copied,
            vec![out.join("kaz.automorf.hfst"), out.join("kaz-tur.autogen.hfst")]
        );
        assert_eq!(
            fs::read_to_string(out.join("kaz-tur.autogen.hfst")).unwrap(),
            "nested/dir/kaz-tur.autogen.hfst"
        );
    }

    #[test]
    fn test_harvest_empty_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let out = temp.path().join("dist/tst");
        touch(&repo, "README");

        let copied = harvest(&repo, &out).unwrap();
        assert!(copied.is_empty());
        assert!(out.is_dir());
    }

    #[test]
    fn test_harvest_same_name_last_wins() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let out = temp.path().join("out");
        touch(&repo, "a/x.rlx");
        touch(&repo, "b/x.rlx");

        let copied = harvest(&repo, &out).unwrap();
        assert_eq!(copied.len(), 2);
        assert_eq!(fs::read_to_string(out.join("x.rlx")).unwrap(), "b/x.rlx");
    }

    #[test]
    fn test_find_artifacts_follows_file_symlinks() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, ".deps/target");
        std::os::unix::fs::symlink(".deps/target", root.join("kaz.automorf.hfst")).unwrap();
        std::os::unix::fs::symlink("missing", root.join("dangling.rlx")).unwrap();
        fs::create_dir_all(root.join("real")).unwrap();
        std::os::unix::fs::symlink("real", root.join("dir.rlx")).unwrap();

        let found = find_artifacts(root, ARTIFACT_PATTERNS).unwrap();
        assert_eq!(names(&found), vec!["kaz.automorf.hfst"]);
    }

    #[test]
    fn test_harvest_copies_symlink_target_contents() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let out = temp.path().join("out");
        touch(&repo, ".deps/target");
        std::os::unix::fs::symlink(".deps/target", repo.join("kaz.automorf.hfst")).unwrap();

        let copied = harvest(&repo, &out).unwrap();

        assert_eq!(copied, vec![out.join("kaz.automorf.hfst")]);
        let dst = out.join("kaz.automorf.hfst");
        assert!(!dst.is_symlink());
        assert_eq!(fs::read_to_string(dst).unwrap(), ".deps/target");
    }

    #[test]
    fn test_copy_read_only_source() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("LICENSE");
        let dst = temp.path().join("out/LICENSE");
        fs::create_dir_all(dst.parent().unwrap()).unwrap();
        fs::write(&src, "gpl").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o444)).unwrap();

        copy_preserving_mtime(&src, &dst).unwrap();
        // A second run overwrites the read-only copy.
        copy_preserving_mtime(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "gpl");
        assert_eq!(
            fs::metadata(&src).unwrap().modified().unwrap(),
            fs::metadata(&dst).unwrap().modified().unwrap()
        );
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.rlx");
        let dst = temp.path().join("dst.rlx");
        fs::write(&src, "data").unwrap();

        let past = SystemTime::now() - Duration::from_secs(86_400);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_preserving_mtime(&src, &dst).unwrap();

        let src_mtime = fs::metadata(&src).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }
}
