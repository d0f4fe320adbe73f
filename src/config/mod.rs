//! Configuration management for filescout
//!
//! Two layers live here:
//! - [`ScanConfig`], the immutable scan policy built from a loosely-typed
//!   configuration record (the `files` table, or a blob handed over by a host).
//! - [`FilescoutConfig`], the figment-backed loader that merges embedded defaults,
//!   user/project files, environment variables and CLI overrides.

use crate::error::ScanError;
use crate::scanner::BackendPreference;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

pub mod core;
pub mod overrides;

pub use core::FilescoutConfig;

/// Default roots, expanded against the home directory at scan time
pub const DEFAULT_ROOTS: &[&str] = &["~/Documents", "~/Downloads", "~/Projects"];

/// Version control, cache and virtualenv directories nobody wants in a file menu
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    ".cache",
];

pub const DEFAULT_MAX_DEPTH: i64 = 5;
pub const DEFAULT_MAX_FILES: usize = 10_000;

/// Scan policy for one scan invocation
///
/// Constructed once, then only read. Root order is significant: it decides both
/// which duplicate wins and which files survive truncation to `max_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Root directories in declaration order (`~` shorthand allowed)
    pub roots: Vec<String>,
    /// `<= 0` means unbounded
    pub max_depth: i64,
    /// Extensions without the leading dot; empty means every extension
    pub include_extensions: Vec<String>,
    /// Bare names pruned wherever they appear below a root
    pub exclude_patterns: Vec<String>,
    /// Hard cap on results across all roots
    pub max_files: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: DEFAULT_ROOTS.iter().map(|s| s.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            include_extensions: vec![],
            exclude_patterns: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl ScanConfig {
    /// Build a scan policy from a configuration record
    ///
    /// Absent and `null` fields take their defaults and unknown fields are ignored.
    /// A field holding the wrong type, or a non-positive `max_files`, fails with
    /// [`ScanError::ConfigInvalid`]; the caller decides whether to fall back to
    /// [`ScanConfig::default`] or abort.
    pub fn from_record(record: &Value) -> Result<Self, ScanError> {
        let map = match record {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(ScanError::config(
                    "<record>",
                    format!("expected a table, found {}", json_kind(other)),
                ));
            }
        };

        let mut config = Self::default();

        if let Some(paths) = field::<Vec<String>>(map, "scan_paths")? {
            config.roots = clean_list(paths);
        }
        if let Some(depth) = field::<i64>(map, "max_depth")? {
            config.max_depth = depth;
        }
        if let Some(extensions) = field::<Vec<String>>(map, "include_extensions")? {
            config.include_extensions = normalize_extensions(extensions);
        }
        if let Some(patterns) = field::<Vec<String>>(map, "exclude_patterns")? {
            config.exclude_patterns = clean_list(patterns);
        }
        if let Some(max_files) = field::<i64>(map, "max_files")? {
            if max_files <= 0 {
                return Err(ScanError::config(
                    "max_files",
                    format!("must be a positive integer, got {max_files}"),
                ));
            }
            config.max_files = max_files as usize;
        }

        Ok(config)
    }

    /// Serialize back into the record shape [`ScanConfig::from_record`] reads
    pub fn to_record(&self) -> Value {
        json!({
            "scan_paths": self.roots,
            "max_depth": self.max_depth,
            "include_extensions": self.include_extensions,
            "exclude_patterns": self.exclude_patterns,
            "max_files": self.max_files,
        })
    }

    /// Reject bounds a scan must never run with
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.max_files == 0 {
            return Err(ScanError::config("max_files", "must be a positive integer, got 0"));
        }
        if let Some(ext) = self.include_extensions.iter().find(|e| e.starts_with('.')) {
            return Err(ScanError::config(
                "include_extensions",
                format!("'{ext}' must not carry a leading dot"),
            ));
        }
        Ok(())
    }

    /// Depth bound, `None` when unbounded
    pub fn depth_limit(&self) -> Option<usize> {
        (self.max_depth > 0).then_some(self.max_depth as usize)
    }

    /// Whether a file or directory name matches an exclusion pattern exactly
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p == name)
    }

    /// Whether a file name passes the extension allow-list (case-sensitive)
    pub fn accepts_extension(&self, file_name: &str) -> bool {
        if self.include_extensions.is_empty() {
            return true;
        }
        std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.include_extensions.iter().any(|e| e == ext))
    }
}

/// Scanner settings from the `[scan]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// auto, delegate or walker
    pub backend: BackendPreference,

    /// Upper bound for one delegate invocation (seconds)
    pub delegate_timeout_secs: u64,

    /// Executables probed, in order, for the delegate backend
    pub delegate_programs: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            delegate_timeout_secs: 30,
            delegate_programs: vec!["fd".to_string(), "fdfind".to_string()],
        }
    }
}

impl ScanSettings {
    pub fn delegate_timeout(&self) -> Duration {
        Duration::from_secs(self.delegate_timeout_secs.max(1))
    }
}

/// Pull one typed field out of a record; `null` counts as absent
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Result<Option<T>, ScanError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ScanError::config(key, e.to_string())),
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn normalize_extensions(values: Vec<String>) -> Vec<String> {
    clean_list(
        values
            .into_iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .collect(),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
