use crate::error::ScanError;
use serde::Serialize;
use std::path::PathBuf;

/// Which execution strategy produced a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// External search utility (fd)
    Delegate,
    /// In-process recursive walk
    Walker,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Delegate => write!(f, "delegate"),
            BackendKind::Walker => write!(f, "walker"),
        }
    }
}

/// A configured root that expanded to an existing directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    /// Root string as written in the configuration
    pub declared: String,
    /// Absolute directory path
    pub path: PathBuf,
}

/// Outcome of scanning a single root
pub type RootScan = Result<Vec<PathBuf>, ScanError>;

/// What a backend hands back before aggregation
#[derive(Debug, Default)]
pub struct BackendOutput {
    /// One list per scanned root, in root order
    pub per_root: Vec<Vec<PathBuf>>,
    pub diagnostics: Vec<ScanError>,
    pub roots_scanned: usize,
    /// The running total reached `max_files` and scanning stopped early
    pub capped: bool,
    pub cancelled: bool,
}

/// Statistics from a scanning operation
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanStats {
    pub roots_configured: usize,
    pub roots_resolved: usize,
    pub roots_scanned: usize,
    /// Paths returned by the backend before dedup and truncation
    pub raw_hits: usize,
    pub scan_duration_ms: u64,
}

/// Result of a scanning operation
///
/// `files` is the ScanResult proper: absolute paths, no duplicates, at most
/// `max_files` long. Everything that degraded the scan is in `diagnostics`.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub files: Vec<PathBuf>,
    pub backend: BackendKind,
    pub diagnostics: Vec<ScanError>,
    pub cancelled: bool,
    /// More eligible files may exist beyond the cap
    pub truncated: bool,
    pub stats: ScanStats,
}

impl ScanReport {
    /// Whether any root or subtree was skipped, or the scan was cut short
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
