//! Delegate backend: offload traversal to `fd`
//!
//! The scan policy is translated into a plain argument vector (no shell). Each root
//! is one invocation bounded by a timeout; a root that times out or exits non-zero
//! contributes nothing and the scan moves on.

use super::types::{BackendOutput, ResolvedRoot, RootScan};
use crate::config::ScanConfig;
use crate::error::ScanError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct DelegateBackend {
    program: PathBuf,
    timeout: Duration,
}

impl DelegateBackend {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments for one root: `--type f --absolute-path [--max-depth N]
    /// (--exclude P)* (--extension E)* ROOT`
    pub fn args(&self, config: &ScanConfig, root: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--type".into(), "f".into(), "--absolute-path".into()];

        if let Some(depth) = config.depth_limit() {
            args.push("--max-depth".into());
            args.push(depth.to_string().into());
        }

        for pattern in &config.exclude_patterns {
            args.push("--exclude".into());
            args.push(pattern.into());
        }

        for ext in &config.include_extensions {
            args.push("--extension".into());
            args.push(ext.into());
        }

        args.push(root.as_os_str().to_owned());
        args
    }

    /// Run the utility against a single root
    pub async fn scan_root(
        &self,
        config: &ScanConfig,
        root: &ResolvedRoot,
        cancel: &CancellationToken,
    ) -> RootScan {
        let mut command = Command::new(&self.program);
        command
            .args(self.args(config, &root.path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!("Running {} on {}", self.program.display(), root.path.display());

        let child = command.spawn().map_err(|e| ScanError::DelegateLaunch {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        // Dropping the wait future drops the child, and kill_on_drop reaps it
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScanError::Cancelled),
            waited = tokio::time::timeout(self.timeout, child.wait_with_output()) => match waited {
                Err(_) => {
                    return Err(ScanError::DelegateTimeout {
                        root: root.path.clone(),
                        timeout: self.timeout,
                    });
                }
                Ok(Err(e)) => {
                    return Err(ScanError::DelegateFailure {
                        root: root.path.clone(),
                        status: None,
                        stderr: e.to_string(),
                    });
                }
                Ok(Ok(output)) => output,
            },
        };

        if !output.status.success() {
            return Err(ScanError::DelegateFailure {
                root: root.path.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // fd prints in traversal-thread order; sorting matches the walker's order
        let mut paths = parse_output(&output.stdout);
        paths.sort();
        Ok(paths)
    }

    /// Scan roots one after another until the cap is reached
    pub async fn scan_roots(
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

            let scan = self.scan_root(config, root, cancel).await;
            out.roots_scanned += 1;

            match scan {
                Ok(paths) => {
                    tracing::debug!("{}: {} files", root.path.display(), paths.len());
                    total += paths.len();
                    out.per_root.push(paths);
                }
                Err(ScanError::Cancelled) => {
                    out.cancelled = true;
                    break;
                }
                Err(err) => {
                    tracing::warn!("Skipping root {}: {}", root.declared, err);
                    out.diagnostics.push(err);
                    out.per_root.push(Vec::new());
                }
            }

            if total >= config.max_files {
                truncate_last(&mut out.per_root, total - config.max_files);
                out.capped = true;
                break;
            }
        }

        out
    }
}

/// Split newline-delimited output into paths, dropping blank lines
pub fn parse_output(stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(bytes_to_path)
        .collect()
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

fn truncate_last(per_root: &mut [Vec<PathBuf>], excess: usize) {
    if let Some(last) = per_root.last_mut() {
        let keep = last.len().saturating_sub(excess);
        last.truncate(keep);
    }
}
