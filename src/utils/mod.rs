//! Utility functions for filescout
//!
//! Small path helpers shared by the CLI, the terminal host and the files plugin.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the user's home directory
pub fn get_home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Per-user directory holding config.toml and the plugin data store
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("filescout"))
}

/// Ensure a directory exists
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Render a path with the home directory shortened to `~`
pub fn abbreviate_home(path: &Path) -> String {
    match get_home_dir() {
        Some(home) => abbreviate_with(path, &home),
        None => path.display().to_string(),
    }
}

fn abbreviate_with(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}
