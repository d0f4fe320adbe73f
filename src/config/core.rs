use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::overrides::prune_unset;
use super::{ScanConfig, ScanSettings};

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

pub const ENV_PREFIX: &str = "FILESCOUT_";

const FORMATS: &[&str] = &["toml", "json", "yaml", "yml"];

pub struct FilescoutConfig {
    figment: Figment,
}

impl FilescoutConfig {
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // 1. Defaults (lowest)

        if let Some(base) = Self::user_config_base_path() {
            figment = merge_any_format(figment, &base); // 2. User config
        }
        figment = merge_any_format(figment, Path::new("filescout")); // 3. Project config

        if let Some(custom_path) = custom_config {
            // 4. Custom config, which must exist when asked for
            let path = Path::new(custom_path);
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            figment = merge_file(figment, path);
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__")); // 5. Environment

        if let Some(cli) = cli_overrides {
            // 6. CLI (highest priority)
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            let value = prune_unset(cli);
            if !value.is_null() {
                figment = figment.merge(Serialized::defaults(value));
            }
        }

        Ok(FilescoutConfig { figment })
    }

    /// Get a nested object/section as JSON
    pub fn get_section(&self, path: &str) -> Result<Value> {
        let value = self.figment.extract_inner(path)?;
        Ok(value)
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<Value> {
        let value = self.figment.extract()?;
        Ok(value)
    }

    /// The `[files]` table, the record [`ScanConfig::from_record`] consumes
    pub fn files_record(&self) -> Value {
        self.get_section("files").unwrap_or(Value::Null)
    }

    pub fn scan_config(&self) -> Result<ScanConfig> {
        let config = ScanConfig::from_record(&self.files_record())?;
        Ok(config)
    }

    pub fn scan_settings(&self) -> Result<ScanSettings> {
        if self.figment.find_value("scan").is_err() {
            return Ok(ScanSettings::default());
        }
        self.figment
            .extract_inner("scan")
            .context("Failed to parse [scan] settings")
    }

    /// Configured open command template, if any
    pub fn open_command(&self) -> Option<String> {
        self.figment.extract_inner("open.command").ok()
    }

    /// Directory holding user-level configuration and host data
    pub fn user_config_dir() -> Option<PathBuf> {
        crate::utils::get_config_dir()
    }

    fn user_config_base_path() -> Option<PathBuf> {
        Self::user_config_dir().map(|dir| dir.join("config"))
    }
}

/// Merge `<base>.toml`, `<base>.json`, `<base>.yaml` and `<base>.yml`; missing files are skipped
fn merge_any_format(figment: Figment, base: &Path) -> Figment {
    FORMATS.iter().fold(figment, |figment, ext| {
        merge_file(figment, &base.with_extension(ext))
    })
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}
