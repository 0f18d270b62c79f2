// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! File discovery: scanning a directory for dot-env files, filtering them
//! by the configured dimensions and the current platform stack, and
//! returning them in the deterministic order the loader must read them in.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use xpand_platform::KNOWN_TAGS;

use crate::error::LoadError;
use crate::filter::{decompose_tokens, wildcard_or_match, EnvFilter};
use crate::Accumulator;

/// Scans `dir` for files satisfying every filter in `filters`, optionally
/// restricted by `platform_tags` (the ordered stack from
/// [`xpand_platform::classify`]; `None` disables platform filtering
/// entirely), skipping anything already in `accumulator`.
///
/// Returns paths ordered broadest-platform-group first, dotted filenames
/// before undotted within a group, alphabetically within that, with
/// `custom_path` (if given and a readable file) appended last regardless of
/// whether it matches any filter. Every returned path is marked loaded in
/// `accumulator` before this call returns.
pub fn discover(
    dir: &Path,
    filters: &[EnvFilter],
    platform_tags: Option<&[String]>,
    custom_path: Option<&Path>,
    accumulator: &mut Accumulator,
) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::DirRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut matched: Vec<(i32, bool, String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::DirRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
        if accumulator.contains(&canonical) {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().into_owned();
        let tokens = decompose_tokens(&filename);
        if !filters.iter().all(|f| f.matches(&tokens)) {
            continue;
        }

        let Some(rank) = platform_rank(&tokens, platform_tags) else {
            continue;
        };
        let dotted = filename.starts_with('.');
        matched.push((rank, dotted, filename, path));
    }

    matched.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
    let mut result: Vec<PathBuf> = matched.into_iter().map(|(_, _, _, path)| path).collect();

    if let Some(custom) = custom_path {
        if custom.is_file() {
            result.push(custom.to_path_buf());
        }
    }

    for path in &result {
        accumulator.mark_loaded(path.canonicalize().unwrap_or_else(|_| path.clone()));
    }

    Ok(result)
}

/// Decides whether `tokens` belongs to the current platform and, if so,
/// ranks it for ordering (lower is broader, and comes first).
///
/// Platform filtering is itself the same "wildcard or match" rule as an
/// [`EnvFilter`] dimension, over the fixed vocabulary [`KNOWN_TAGS`] instead
/// of a caller-supplied `all_values`: a filename naming no known platform
/// tag is universal (it applies to every platform, ranked broadest); one
/// naming only tags present in the current stack is ranked by the
/// broadest-matching tag's position in that stack; one naming a tag absent
/// from the stack is rejected outright.
fn platform_rank(tokens: &HashSet<String>, platform_tags: Option<&[String]>) -> Option<i32> {
    let Some(stack) = platform_tags else {
        return Some(0);
    };
    let vocabulary: HashSet<String> = KNOWN_TAGS.iter().map(|s| s.to_string()).collect();
    let current: HashSet<String> = stack.iter().cloned().collect();
    if !wildcard_or_match(&current, &vocabulary, tokens) {
        return None;
    }
    let named: Vec<&str> = KNOWN_TAGS.iter().copied().filter(|tag| tokens.contains(*tag)).collect();
    if named.is_empty() {
        return Some(-1);
    }
    named
        .iter()
        .filter_map(|tag| stack.iter().position(|t| t == tag))
        .min()
        .map(|pos| pos as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn scenario_seven_file_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in [".env", ".env.linux", ".env.prod.linux", ".env.dev.linux"] {
            touch(dir.path(), name);
        }
        let custom = dir.path().join("app.env");
        fs::write(&custom, "").unwrap();

        let filter = EnvFilter::new(
            ["prod".to_string()],
            ["dev".to_string(), "test".to_string(), "prod".to_string()],
        );
        let platform_tags = vec!["posix".to_string(), "linux".to_string()];
        let mut accumulator = Accumulator::new();

        let files = discover(dir.path(), &[filter], Some(&platform_tags), Some(&custom), &mut accumulator).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names.last().unwrap(), "app.env");
        assert!(!names.contains(&".env.dev.linux".to_string()));
        assert_eq!(names.len(), 4);
        assert_eq!(names[0], ".env");
        assert!(names[1..3].contains(&".env.linux".to_string()));
        assert!(names[1..3].contains(&".env.prod.linux".to_string()));
    }

    #[test]
    fn accumulator_skips_already_loaded_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".env");
        let mut accumulator = Accumulator::new();

        let first = discover(dir.path(), &[], None, None, &mut accumulator).unwrap();
        assert_eq!(first.len(), 1);
        let second = discover(dir.path(), &[], None, None, &mut accumulator).unwrap();
        assert!(second.is_empty());

        accumulator.reset();
        let third = discover(dir.path(), &[], None, None, &mut accumulator).unwrap();
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn platform_filtering_rejects_other_platforms() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".env.windows");
        touch(dir.path(), ".env.linux");
        let mut accumulator = Accumulator::new();

        let platform_tags = vec!["posix".to_string(), "linux".to_string()];
        let files = discover(dir.path(), &[], Some(&platform_tags), None, &mut accumulator).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![".env.linux".to_string()]);
    }

    #[test]
    fn disabling_platform_filtering_accepts_every_platform_tag() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".env.windows");
        let mut accumulator = Accumulator::new();

        let files = discover(dir.path(), &[], None, None, &mut accumulator).unwrap();
        assert_eq!(files.len(), 1);
    }
}
