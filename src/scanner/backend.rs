//! Backend selection
//!
//! Picks the execution strategy once per scan: the delegate when its executable is
//! on `PATH`, the fallback walker otherwise. Roots of a single scan never mix
//! backends.

use super::delegate::DelegateBackend;
use super::types::{BackendKind, BackendOutput, ResolvedRoot};
use super::walker::FallbackWalker;
use crate::config::ScanConfig;
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Requested strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Delegate if available, walker otherwise
    #[default]
    Auto,
    /// Prefer the delegate; falls back to the walker when it is not installed
    Delegate,
    /// Always walk in-process
    Walker,
}

#[derive(Debug, Clone)]
pub enum Backend {
    Delegate(DelegateBackend),
    Walker(FallbackWalker),
}

impl Backend {
    pub fn select(preference: BackendPreference, programs: &[String], timeout: Duration) -> Self {
        if preference == BackendPreference::Walker {
            return Backend::Walker(FallbackWalker::new());
        }

        match probe_delegate(programs) {
            Some(program) => {
                tracing::debug!("Using delegate backend: {}", program.display());
                Backend::Delegate(DelegateBackend::new(program, timeout))
            }
            None => {
                if preference == BackendPreference::Delegate {
                    tracing::warn!(
                        "Delegate requested but none of {:?} is installed, walking in-process",
                        programs
                    );
                } else {
                    tracing::debug!("No delegate found, using fallback walker");
                }
                Backend::Walker(FallbackWalker::new())
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Delegate(_) => BackendKind::Delegate,
            Backend::Walker(_) => BackendKind::Walker,
        }
    }

    /// Scan all roots with this backend
    pub async fn scan(
        &self,
        roots: &[ResolvedRoot],
        config: Arc<ScanConfig>,
        cancel: &CancellationToken,
    ) -> BackendOutput {
        match self {
            Backend::Delegate(delegate) => delegate.scan_roots(roots, &config, cancel).await,
            Backend::Walker(walker) => {
                let walker = *walker;
                let roots = roots.to_vec();
                let cancel = cancel.clone();
                let task =
                    tokio::task::spawn_blocking(move || walker.walk(&roots, &config, &cancel));

                match task.await {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::error!("Walker task failed: {}", e);
                        BackendOutput {
                            diagnostics: vec![ScanError::Unreadable {
                                path: None,
                                reason: format!("walker task failed: {e}"),
                            }],
                            ..BackendOutput::default()
                        }
                    }
                }
            }
        }
    }
}

/// First candidate executable found on `PATH`
pub fn probe_delegate(programs: &[String]) -> Option<PathBuf> {
    programs.iter().find_map(|program| which::which(program).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walker_preference_skips_probe() {
        let backend = Backend::select(
            BackendPreference::Walker,
            &["sh".to_string()],
            Duration::from_secs(1),
        );
        assert_eq!(backend.kind(), BackendKind::Walker);
    }

    #[test]
    fn test_missing_delegate_falls_back_to_walker() {
        let programs = vec!["filescout-no-such-tool-12345".to_string()];
        for preference in [BackendPreference::Auto, BackendPreference::Delegate] {
            let backend = Backend::select(preference, &programs, Duration::from_secs(1));
            assert_eq!(backend.kind(), BackendKind::Walker);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_first_available_candidate_wins() {
        let programs = vec!["filescout-no-such-tool-12345".to_string(), "sh".to_string()];
        let backend = Backend::select(BackendPreference::Auto, &programs, Duration::from_secs(3));
        match backend {
            Backend::Delegate(delegate) => {
                assert!(delegate.program().ends_with("sh"));
                assert_eq!(delegate.timeout(), Duration::from_secs(3));
            }
            Backend::Walker(_) => panic!("sh should be on PATH"),
        }
    }

    #[test]
    fn test_preference_parses_lowercase() {
        let pref: BackendPreference = serde_json::from_str("\"walker\"").unwrap();
        assert_eq!(pref, BackendPreference::Walker);
    }
}
