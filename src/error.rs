//! Typed outcomes for scanning
//!
//! Every failure below the scan level is reported as a [`ScanError`] value in the
//! scan report instead of being swallowed. Only [`ScanError::ConfigInvalid`] stops a
//! scan before it starts.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Configured root is missing or not a directory; it is skipped
    #[error("root '{root}' not found (resolved to {})", .resolved.display())]
    RootNotFound { root: String, resolved: PathBuf },

    /// Directory could not be opened; its subtree is skipped
    #[error("permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// Any other I/O error raised while walking a subtree
    #[error("unreadable entry {}: {reason}", .path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<unknown>".to_string()))]
    Unreadable { path: Option<PathBuf>, reason: String },

    /// External search utility exceeded its time bound for one root
    #[error("delegate timed out after {timeout:?} scanning {}", .root.display())]
    DelegateTimeout { root: PathBuf, timeout: Duration },

    /// External search utility exited unsuccessfully for one root
    #[error("delegate failed on {} (exit status {status:?}): {stderr}", .root.display())]
    DelegateFailure {
        root: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    /// External search utility could not be started at all
    #[error("failed to launch {}: {reason}", .program.display())]
    DelegateLaunch { program: PathBuf, reason: String },

    /// The scan was cancelled or hit its deadline; results are partial
    #[error("scan cancelled")]
    Cancelled,

    #[error("invalid configuration field '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },
}

impl ScanError {
    /// Whether this outcome aborts a scan instead of degrading it
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::ConfigInvalid { .. })
    }

    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(ScanError::config("max_files", "must be positive").is_fatal());
        assert!(!ScanError::Cancelled.is_fatal());
        assert!(
            !ScanError::PermissionDenied {
                path: PathBuf::from("/root")
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_messages_name_the_failing_scope() {
        let err = ScanError::DelegateFailure {
            root: PathBuf::from("/data"),
            status: Some(2),
            stderr: "boom".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/data"));
        assert!(message.contains("boom"));

        let err = ScanError::config("max_depth", "expected an integer");
        assert_eq!(
            err.to_string(),
            "invalid configuration field 'max_depth': expected an integer"
        );
    }
}
