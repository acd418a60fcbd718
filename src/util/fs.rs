//! Filesystem utilities.
//!
//! The recursive scanner used by the platform resolvers lives here. It walks
//! from disk on every call, so two scans of the same tree never share state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

/// A regular file yielded by [`scan_files_recursively`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name without any directory components
    pub name: String,

    /// Full path to the file
    pub path: PathBuf,
}

/// Lazily walk `root` and yield every regular file underneath it.
///
/// Symlinks are followed; a directory whose canonical path was already
/// visited is not entered again, so symlink cycles terminate. Directories
/// matching one of `ignore` (matched against the path relative to `root`)
/// are pruned. Nothing else is excluded, `node_modules` included.
///
/// Unreadable entries are skipped with a warning.
pub fn scan_files_recursively(root: &Path, ignore: &[Pattern]) -> impl Iterator<Item = FileEntry> {
    let base = root.to_path_buf();
    let ignore = ignore.to_vec();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            if entry.depth() > 0 && is_ignored(&base, entry.path(), &ignore) {
                return false;
            }
            if entry.file_type().is_dir() {
                let real = normalize_path(entry.path());
                if !visited.insert(real) {
                    tracing::debug!("skipping already visited directory {}", entry.path().display());
                    return false;
                }
            }
            true
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) if err.loop_ancestor().is_some() => {
                tracing::debug!("skipping symlink cycle: {}", err);
                None
            }
            Err(err) => {
                tracing::warn!("skipping unreadable path: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.into_path(),
        })
}

fn is_ignored(base: &Path, path: &Path, ignore: &[Pattern]) -> bool {
    let relative = path.strip_prefix(base).unwrap_or(path);
    ignore.iter().any(|pattern| pattern.matches_path(relative))
}

/// Compile glob patterns, failing on the first invalid one.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p.as_ref()).with_context(|| format!("invalid glob pattern: {}", p.as_ref()))
        })
        .collect()
}

/// Find files matching glob patterns relative to a base directory.
///
/// The base directory is escaped, so paths containing glob metacharacters
/// (`[`, `*`) are matched literally. Results are sorted and deduplicated.
pub fn glob_files(base: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let escaped_base = Pattern::escape(&base.to_string_lossy());
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = format!("{}/{}", escaped_base.trim_end_matches('/'), pattern);

        for entry in glob::glob(&full_pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward slashes, as Gradle and Xcode expect.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(root: &Path, ignore: &[Pattern]) -> Vec<String> {
        scan_files_recursively(root, ignore)
            .map(|f| relative_path(root, &f.path).to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_is_sorted_and_recursive() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a/b/c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("Deep.kt"), "").unwrap();
        fs::write(tmp.path().join("z.txt"), "").unwrap();
        fs::write(tmp.path().join("a/y.txt"), "").unwrap();

        assert_eq!(names(tmp.path(), &[]), vec!["a/b/c/Deep.kt", "a/y.txt", "z.txt"]);
    }

    #[test]
    fn test_scan_enters_node_modules_but_honors_ignore() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("node_modules/dep/src")).unwrap();
        fs::create_dir_all(tmp.path().join("build/generated")).unwrap();
        fs::write(tmp.path().join("node_modules/dep/src/Dep.kt"), "").unwrap();
        fs::write(tmp.path().join("build/generated/Gen.kt"), "").unwrap();

        let ignore = compile_patterns(&["**/build"]).unwrap();
        assert_eq!(names(tmp.path(), &ignore), vec!["node_modules/dep/src/Dep.kt"]);
    }

    #[test]
    fn test_scan_is_restartable() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("One.kt"), "").unwrap();

        let first = names(tmp.path(), &[]);
        fs::write(tmp.path().join("Two.kt"), "").unwrap();
        let second = names(tmp.path(), &[]);

        assert_eq!(first, vec!["One.kt"]);
        assert_eq!(second, vec!["One.kt", "Two.kt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_survives_symlink_cycle() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("src");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Real.kt"), "").unwrap();
        std::os::unix::fs::symlink(tmp.path(), dir.join("loop")).unwrap();

        let found = names(tmp.path(), &[]);
        assert_eq!(found, vec!["src/Real.kt"]);
    }

    #[test]
    fn test_scan_missing_root_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(names(&tmp.path().join("missing"), &[]).is_empty());
    }

    #[test]
    fn test_glob_files_escapes_base() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("weird[dir]");
        fs::create_dir_all(base.join("pkg")).unwrap();
        fs::write(base.join("pkg/package.json"), "{}").unwrap();

        let files = glob_files(&base, &["*/package.json"]).unwrap();
        assert_eq!(files, vec![base.join("pkg/package.json")]);
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b")), "a/b");
    }
}
