//! Root resolution
//!
//! Expands `~` shorthand, makes each root absolute and drops the ones that do not
//! exist. Dropping is reported, never fatal.

use super::types::ResolvedRoot;
use crate::error::ScanError;
use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` against the home directory
///
/// `~user` forms are left untouched and will resolve relative to the current
/// directory like any other relative path.
pub fn expand_home(root: &str) -> PathBuf {
    let rest = if root == "~" {
        Some("")
    } else {
        root.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(root),
    }
}

/// Resolve one configured root to an absolute, existing directory
pub fn resolve_root(root: &str) -> Result<ResolvedRoot, ScanError> {
    let expanded = expand_home(root);
    let path = std::path::absolute(&expanded).unwrap_or(expanded);

    if !path.is_dir() {
        return Err(ScanError::RootNotFound {
            root: root.to_string(),
            resolved: path,
        });
    }

    Ok(ResolvedRoot {
        declared: root.to_string(),
        path,
    })
}

/// Resolve every root in declaration order
///
/// Returns the usable roots plus a `RootNotFound` for each one dropped. A root
/// resolving to a directory already in the list is scanned only once.
pub fn resolve_roots(roots: &[String]) -> (Vec<ResolvedRoot>, Vec<ScanError>) {
    let mut resolved: Vec<ResolvedRoot> = Vec::with_capacity(roots.len());
    let mut dropped = Vec::new();

    for root in roots {
        match resolve_root(root) {
            Ok(candidate) => {
                if contains_path(&resolved, &candidate.path) {
                    tracing::debug!("Root '{}' repeats {}, skipping", root, candidate.path.display());
                    continue;
                }
                tracing::trace!("Resolved root '{}' -> {}", root, candidate.path.display());
                resolved.push(candidate);
            }
            Err(err) => {
                tracing::debug!("Dropping root: {}", err);
                dropped.push(err);
            }
        }
    }

    (resolved, dropped)
}

fn contains_path(roots: &[ResolvedRoot], path: &Path) -> bool {
    roots.iter().any(|r| r.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().expect("home directory available in tests");
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/Documents"), home.join("Documents"));
        assert_eq!(expand_home("/etc"), PathBuf::from("/etc"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }

    #[test]
    fn test_missing_roots_are_dropped_in_order() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        fs::create_dir(&first).unwrap();
        fs::create_dir(&second).unwrap();

        let roots = vec![
            second.display().to_string(),
            temp.path().join("missing").display().to_string(),
            first.display().to_string(),
        ];
        let (resolved, dropped) = resolve_roots(&roots);

        assert_eq!(
            resolved.iter().map(|r| r.path.clone()).collect::<Vec<_>>(),
            vec![second, first]
        );
        assert_eq!(dropped.len(), 1);
        assert!(matches!(dropped[0], ScanError::RootNotFound { .. }));
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let err = resolve_root(&file.display().to_string()).unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound { .. }));
    }

    #[test]
    fn test_duplicate_roots_are_scanned_once() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().display().to_string();
        let (resolved, dropped) = resolve_roots(&[root.clone(), root]);
        assert_eq!(resolved.len(), 1);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_resolved_paths_are_absolute() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_root(&temp.path().display().to_string()).unwrap();
        assert!(resolved.path.is_absolute());
    }
}
