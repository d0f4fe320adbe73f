//! Fallback walker: in-process recursive traversal
//!
//! Mirrors the delegate's filter semantics without spawning anything:
//! - hidden (dot) names and exact exclusion matches are pruned, so an excluded
//!   directory's subtree is never read
//! - `max_depth = N` lists entries up to N levels below the root (files directly in
//!   the root are level 1) and never opens directories at level N
//! - the extension allow-list is an exact, case-sensitive suffix match
//! - symlinks are neither followed nor reported
//!
//! Unreadable directories are reported and skipped; the walk carries on with
//! their siblings.

use super::types::{BackendOutput, ResolvedRoot};
use crate::config::ScanConfig;
use crate::error::ScanError;
use std::io;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackWalker;

impl FallbackWalker {
    pub fn new() -> Self {
        Self
    }

    /// Walk every root in order, stopping once `max_files` paths are collected
    pub fn walk(
        &self,
        roots: &[ResolvedRoot],
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> BackendOutput {
        let mut out = BackendOutput::default();
        let mut total = 0usize;

        for root in roots {
            if cancel.is_cancelled() {
                out.cancelled = true;
                break;
            }

            let mut found = Vec::new();
            let stop = self.walk_root(root, config, cancel, &mut total, &mut found, &mut out);

            tracing::debug!("{}: {} files", root.path.display(), found.len());
            out.per_root.push(found);
            out.roots_scanned += 1;

            if stop {
                break;
            }
        }

        out
    }

    /// Returns true when the whole walk must stop (cap reached or cancelled)
    fn walk_root(
        &self,
        root: &ResolvedRoot,
        config: &ScanConfig,
        cancel: &CancellationToken,
        total: &mut usize,
        found: &mut Vec<std::path::PathBuf>,
        out: &mut BackendOutput,
    ) -> bool {
        let mut walk = WalkDir::new(&root.path)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = config.depth_limit() {
            walk = walk.max_depth(depth);
        }

        let entries = walk
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry, config));

        for entry in entries {
            if cancel.is_cancelled() {
                out.cancelled = true;
                return true;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let diagnostic = classify(err);
                    tracing::debug!("Skipping subtree: {}", diagnostic);
                    out.diagnostics.push(diagnostic);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if !config.accepts_extension(&entry.file_name().to_string_lossy()) {
                continue;
            }

            found.push(entry.into_path());
            *total += 1;

            if *total >= config.max_files {
                out.capped = true;
                return true;
            }
        }

        false
    }
}

/// Dot-named entries are never listed or descended into
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_pruned(entry: &DirEntry, config: &ScanConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    is_hidden(&name) || config.is_excluded(&name)
}

fn classify(err: walkdir::Error) -> ScanError {
    let path = err.path().map(Path::to_path_buf);
    let denied = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied);

    match path {
        Some(path) if denied => ScanError::PermissionDenied { path },
        path => ScanError::Unreadable {
            path,
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, relative).unwrap();
        path
    }

    fn root(path: &Path) -> ResolvedRoot {
        ResolvedRoot {
            declared: path.display().to_string(),
            path: path.to_path_buf(),
        }
    }

    fn config(max_depth: i64, max_files: usize) -> ScanConfig {
        ScanConfig {
            roots: vec![],
            max_depth,
            include_extensions: vec![],
            exclude_patterns: vec![".git".into(), "node_modules".into()],
            max_files,
        }
    }

    fn walk(roots: &[ResolvedRoot], config: &ScanConfig) -> BackendOutput {
        FallbackWalker::new().walk(roots, config, &CancellationToken::new())
    }

    fn all(out: &BackendOutput) -> Vec<PathBuf> {
        out.per_root.iter().flatten().cloned().collect()
    }

    #[test]
    fn test_scenario_depth_exclusion_and_cap() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
            touch(t, name);
        }
        touch(t, ".git/config");
        touch(t, "one/two/deep.txt");

        let out = walk(&[root(t)], &config(2, 3));
        let files = all(&out);

        assert_eq!(files.len(), 3);
        assert_eq!(files, vec![t.join("a.txt"), t.join("b.txt"), t.join("c.txt")]);
        assert!(out.capped);
    }

    #[test]
    fn test_depth_bound_matches_fd_levels() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let top = touch(t, "top.txt");
        let level2 = touch(t, "a/level2.txt");
        touch(t, "a/b/level3.txt");

        let files = all(&walk(&[root(t)], &config(2, 100)));
        assert_eq!(files, vec![level2, top]);

        let unbounded = all(&walk(&[root(t)], &config(0, 100)));
        assert_eq!(unbounded.len(), 3);
    }

    #[test]
    fn test_excluded_and_hidden_subtrees_are_pruned() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let kept = touch(t, "src/main.rs");
        touch(t, "node_modules/pkg/index.js");
        touch(t, "src/node_modules/nested.js");
        touch(t, ".hidden/inside.txt");
        touch(t, ".dotfile");
        touch(t, "src/.env");

        let files = all(&walk(&[root(t)], &config(0, 100)));
        assert_eq!(files, vec![kept]);
    }

    #[test]
    fn test_excluded_file_names_are_skipped() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        touch(t, "node_modules");
        let kept = touch(t, "readme.md");

        let files = all(&walk(&[root(t)], &config(0, 100)));
        assert_eq!(files, vec![kept]);
    }

    #[test]
    fn test_hidden_root_is_still_scanned() {
        let temp = TempDir::new().unwrap();
        let hidden_root = temp.path().join(".config");
        let file = touch(&hidden_root, "settings.toml");

        let files = all(&walk(&[root(&hidden_root)], &config(0, 100)));
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_extension_filter_is_exact() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let md = touch(t, "notes.md");
        touch(t, "NOTES.MD");
        touch(t, "notes.markdown");
        touch(t, "Makefile");
        let gz = touch(t, "backup.tar.gz");

        let config = ScanConfig {
            include_extensions: vec!["md".into(), "gz".into()],
            ..config(0, 100)
        };
        let files = all(&walk(&[root(t)], &config));
        assert_eq!(files, vec![gz, md]);
    }

    #[test]
    fn test_cap_is_shared_across_roots() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        let f1 = touch(&first, "1.txt");
        let f2 = touch(&first, "2.txt");
        let s1 = touch(&second, "1.txt");
        touch(&second, "2.txt");

        let out = walk(&[root(&first), root(&second)], &config(0, 3));
        assert_eq!(out.per_root, vec![vec![f1, f2], vec![s1]]);
        assert!(out.capped);
    }

    #[test]
    fn test_walk_stops_before_later_roots_once_capped() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        touch(&first, "1.txt");
        touch(&second, "1.txt");

        let out = walk(&[root(&first), root(&second)], &config(0, 1));
        assert_eq!(out.roots_scanned, 1);
        assert_eq!(out.per_root.len(), 1);
    }

    #[test]
    fn test_cancelled_walk_returns_nothing_new() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let out = FallbackWalker::new().walk(&[root(temp.path())], &config(0, 10), &cancel);
        assert!(out.cancelled);
        assert!(all(&out).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_reported() {
        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let real = touch(t, "real.txt");
        std::os::unix::fs::symlink(&real, t.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(t, t.join("loop")).unwrap();

        let files = all(&walk(&[root(t)], &config(0, 100)));
        assert_eq!(files, vec![real]);
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_skips_only_that_subtree() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let t = temp.path();
        let open = touch(t, "open/visible.txt");
        touch(t, "locked/secret.txt");
        let locked = t.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read anything; nothing to assert then
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let out = walk(&[root(t)], &config(0, 100));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(all(&out), vec![open]);
        assert_eq!(out.diagnostics, vec![ScanError::PermissionDenied { path: locked }]);
    }
}
