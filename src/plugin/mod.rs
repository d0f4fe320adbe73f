//! Menu plugins built on the scanner

use serde::Serialize;

pub mod files;

pub use files::{FilesConfig, FilesPlugin};

/// Plugin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub api_version: &'static str,
}
