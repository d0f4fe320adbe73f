//! File discovery engine
//!
//! Data flow: [`ScanConfig`](crate::config::ScanConfig) → root resolution →
//! backend selection (once per scan) → per-root path lists → aggregation.

pub mod aggregate;
pub mod backend;
pub mod core;
pub mod delegate;
pub mod roots;
pub mod types;
pub mod walker;

// Re-export main types for easier access
pub use aggregate::{Aggregated, aggregate};
pub use backend::{Backend, BackendPreference, probe_delegate};
pub use core::{ScanOptions, Scanner};
pub use delegate::DelegateBackend;
pub use roots::{expand_home, resolve_roots};
pub use types::{BackendKind, ResolvedRoot, RootScan, ScanReport, ScanStats};
pub use walker::FallbackWalker;
