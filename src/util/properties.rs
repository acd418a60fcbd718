//! Minimal reader for Java-style `.properties` files (`gradle.properties`).
//!
//! Lines are `key=value`; blank lines and lines starting with `#` or `!` are
//! comments. When a key appears more than once the first occurrence wins.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

/// Look up `key` in properties `contents`. First match wins.
pub fn get_property(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim().to_string())
        })
}

/// Read `key` from the properties file at `path`.
///
/// A missing file is not an error and yields `None`.
pub fn read_property(path: &Path, key: &str) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(get_property(&contents, key)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_match_wins() {
        let contents = "# header\nkey=1\nother=x\n\nkey=2\n";
        assert_eq!(get_property(contents, "key"), Some("1".to_string()));
    }

    #[test]
    fn test_comments_are_skipped() {
        let contents = "#key=commented\n! key=bang\nkey = spaced value \n";
        assert_eq!(get_property(contents, "key"), Some("spaced value".to_string()));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let contents = "android.extraMavenRepos=[{\"url\":\"https://x?a=b\"}]\n";
        assert_eq!(
            get_property(contents, "android.extraMavenRepos"),
            Some("[{\"url\":\"https://x?a=b\"}]".to_string())
        );
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(get_property("a=1\n", "b"), None);
        assert_eq!(get_property("no separator here\n", "no"), None);
    }

    #[test]
    fn test_read_property_missing_file() {
        let tmp = TempDir::new().unwrap();
        let value = read_property(&tmp.path().join("gradle.properties"), "key").unwrap();
        assert!(value.is_none());
    }
}
