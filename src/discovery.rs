//! Source file discovery
//!
//! Walks a directory tree and collects the files matching a discovery pattern.
//! A pattern starting with `*` matches every file whose "format" (the text
//! after the last `.` of its name, or the whole name when it has no `.`)
//! equals the rest of the pattern. Any other pattern matches by exact name.

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

use crate::error::{ExtractError, Result};
use crate::language::WILDCARD;

/// Find every file under `root` matching `pattern`.
///
/// Files are returned in traversal order: depth first, sorted by name within
/// each directory. `.git` directories and entries whose name matches one of
/// `ignore_patterns` are skipped. Symbolic links to files are returned;
/// symbolic links to directories are not followed.
///
/// # Errors
///
/// Returns `FileSystem` if `root` is missing or not a directory.
pub fn find_files(pattern: &str, root: &Path, ignore_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let metadata = root.metadata().map_err(|source| ExtractError::FileSystem {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ExtractError::FileSystem {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let patterns = ignore_patterns.to_vec();
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| entry.depth() == 0 || !should_ignore_path(entry.path(), &patterns));

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };

        // Links to files are read through; links to directories are not walked.
        let is_file = if entry.path_is_symlink() {
            entry.path().is_file()
        } else {
            entry.file_type().is_some_and(|ft| ft.is_file())
        };
        if !is_file {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if matches_pattern(pattern, &name) {
            files.push(entry.into_path());
        }
    }

    log::debug!(
        "found {} file(s) matching {} under {}",
        files.len(),
        pattern,
        root.display()
    );
    Ok(files)
}

/// Whether a file called `name` matches a discovery pattern.
///
/// # Examples
///
/// ```
/// use gleaner::discovery::matches_pattern;
///
/// assert!(matches_pattern("*java", "Main.java"));
/// assert!(matches_pattern("*makefile", "makefile"));
/// assert!(!matches_pattern("*java", "Main.javax"));
/// assert!(matches_pattern("build.gradle", "build.gradle"));
/// ```
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.strip_prefix(WILDCARD) {
        Some(format) => file_format(name) == format.trim_start_matches('.'),
        None => name == pattern,
    }
}

/// The text after the last `.` of `name`, or all of `name` if it has none.
pub fn file_format(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, format)| format)
}

/// Check if a path should be skipped based on its name and ignore patterns.
pub fn should_ignore_path(path: &Path, ignore_patterns: &[String]) -> bool {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if name == ".git" {
        return true;
    }

    ignore_patterns
        .iter()
        .any(|pattern| name == *pattern || glob_match(pattern, &name))
}

/// Match a glob pattern against a name. Invalid patterns match nothing.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}
