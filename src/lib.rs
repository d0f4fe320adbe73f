//! # filescout - file discovery for launcher menus
//!
//! Lists the regular files under a set of root directories, bounded by depth,
//! name exclusions, an extension allow-list and a total cap.
//!
//! ## Features
//!
//! - **Delegate first**: hands traversal to `fd` when it is on `PATH`
//! - **Fallback walker**: the same filter semantics in-process when it is not
//! - **Never fails a scan**: missing roots, unreadable subtrees, delegate
//!   timeouts and crashes are reported next to the results
//! - **Layered config**: defaults, user and project files, environment and flags
//!
//! ## Quick Start
//!
//! ```no_run
//! use filescout::config::ScanConfig;
//! use filescout::scanner::Scanner;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let scanner = Scanner::new(ScanConfig::default())?;
//! let report = scanner.scan().await;
//! for path in &report.files {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod launch;
pub mod plugin;
pub mod scanner;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::{FilescoutConfig, ScanConfig};
pub use error::ScanError;
pub use scanner::{ScanReport, Scanner};

/// Result type alias for filescout operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
