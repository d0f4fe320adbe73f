//! Files plugin: search the configured roots and open what the user picks

use super::PluginInfo;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::host::{Host, MenuItem};
use crate::launch::{Opener, SystemOpener};
use crate::scanner::{ScanOptions, ScanReport, Scanner, expand_home};
use crate::utils::abbreviate_home;
use anyhow::Result;
use serde_json::{Value, json};
use std::path::Path;

pub const PLUGIN_NAME: &str = "files";
const CONFIG_KEY: &str = "config";

const SETTINGS_ID: &str = "files:settings";
const PATHS_ID: &str = "files:settings:paths";
const DEPTH_ID: &str = "files:settings:depth";
const RESCAN_ID: &str = "files:settings:rescan";
const PATH_PREFIX: &str = "files:path:";
const ADD_PATH_ID: &str = "files:path:add";
const REMOVE_PATH_ID: &str = "files:path:remove";
const DEPTH_PREFIX: &str = "files:depth:";

/// Scan policy plus how files get opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesConfig {
    pub scan: ScanConfig,
    /// Command template; the platform opener when unset
    pub open_command: Option<String>,
}

impl FilesConfig {
    pub fn from_record(record: &Value) -> Result<Self, ScanError> {
        let scan = ScanConfig::from_record(record)?;
        let open_command = match record.get("open_command") {
            None | Some(Value::Null) => None,
            Some(Value::String(command)) => Some(command.clone()),
            Some(_) => return Err(ScanError::config("open_command", "expected a string")),
        };
        Ok(Self { scan, open_command })
    }

    pub fn to_record(&self) -> Value {
        let mut record = self.scan.to_record();
        if let (Some(command), Value::Object(map)) = (&self.open_command, &mut record) {
            map.insert("open_command".to_string(), json!(command));
        }
        record
    }
}

pub struct FilesPlugin {
    config: FilesConfig,
    options: ScanOptions,
    opener: Option<Box<dyn Opener>>,
}

impl FilesPlugin {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            config: FilesConfig::default(),
            options,
            opener: None,
        }
    }

    /// Open files through `opener` instead of the configured command
    pub fn with_opener(mut self, opener: Box<dyn Opener>) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: PLUGIN_NAME,
            version: env!("CARGO_PKG_VERSION"),
            description: "Search and open files",
            api_version: "1",
        }
    }

    pub fn config(&self) -> &FilesConfig {
        &self.config
    }

    /// Load settings from the host; invalid settings fall back to defaults
    pub fn setup(&mut self, host: &mut dyn Host) {
        self.config = match host.load_blob(CONFIG_KEY) {
            None => FilesConfig::default(),
            Some(record) => match FilesConfig::from_record(&record) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring stored files settings: {}", e);
                    host.notify(&format!("Files settings are invalid ({e}), using defaults"));
                    FilesConfig::default()
                }
            },
        };
    }

    pub fn teardown(&mut self, _host: &mut dyn Host) {}

    /// Entry shown in the top-level menu
    pub fn index(&self) -> Vec<MenuItem> {
        vec![MenuItem::submenu(PLUGIN_NAME, "Files").with_plugin(PLUGIN_NAME)]
    }

    pub async fn scan(&self) -> Result<ScanReport> {
        let scanner = Scanner::new(self.config.scan.clone())?.with_options(self.options.clone());
        Ok(scanner.scan().await)
    }

    /// One selectable item per discovered file, in scan order
    pub fn items(&self, report: &ScanReport) -> Vec<MenuItem> {
        report
            .files
            .iter()
            .filter_map(|path| {
                // Ids and metadata are strings; a lossy name would open the wrong file
                let Some(text) = path.to_str() else {
                    tracing::debug!("Skipping non UTF-8 path {}", path.display());
                    return None;
                };
                let title = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(text)
                    .to_string();
                let mut item = MenuItem::action(format!("files:{text}"), title)
                    .with_plugin(PLUGIN_NAME)
                    .with_metadata(json!({ "path": text }));
                if let Some(parent) = path.parent() {
                    item = item.with_badge(abbreviate_home(parent));
                }
                Some(item)
            })
            .collect()
    }

    /// `"settings"` opens the settings menu, an empty action the files menu;
    /// anything else is an item id or a path to open
    pub async fn run(&mut self, host: &mut dyn Host, action: &str) -> Result<()> {
        match action {
            "settings" => self.settings_menu(host).await,
            "" => self.files_menu(host).await,
            target => {
                let path = host
                    .find_item(target)
                    .and_then(|item| item.path())
                    .unwrap_or_else(|| target.into());
                self.open(host, &path);
                Ok(())
            }
        }
    }

    async fn files_menu(&mut self, host: &mut dyn Host) -> Result<()> {
        loop {
            let report = self.scan().await?;
            for diagnostic in &report.diagnostics {
                tracing::info!("{}", diagnostic);
            }

            let mut items = self.items(&report);
            items.push(MenuItem::submenu(SETTINGS_ID, "Settings").with_plugin(PLUGIN_NAME));

            let Some(selected) = host.choose(&items, "Files")? else {
                return Ok(());
            };

            if selected.id == SETTINGS_ID {
                self.settings_menu(host).await?;
            } else if let Some(path) = selected.path() {
                self.open(host, &path);
                return Ok(());
            }
        }
    }

    async fn settings_menu(&mut self, host: &mut dyn Host) -> Result<()> {
        loop {
            let items = vec![
                MenuItem::submenu(PATHS_ID, "Scan Paths")
                    .with_badge(self.config.scan.roots.len().to_string()),
                MenuItem::submenu(DEPTH_ID, "Max Depth").with_badge(depth_label(self.config.scan.max_depth)),
                MenuItem::action(RESCAN_ID, "Rescan Files"),
            ];

            let Some(selected) = host.choose(&items, "Files Settings")? else {
                return Ok(());
            };

            match selected.id.as_str() {
                PATHS_ID => self.edit_paths(host)?,
                DEPTH_ID => self.choose_depth(host)?,
                RESCAN_ID => {
                    let report = self.scan().await?;
                    host.notify(&format!("Found {} files", report.len()));
                    for diagnostic in &report.diagnostics {
                        host.notify(&diagnostic.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    fn edit_paths(&mut self, host: &mut dyn Host) -> Result<()> {
        loop {
            let mut items: Vec<MenuItem> = self
                .config
                .scan
                .roots
                .iter()
                .map(|root| {
                    let item = MenuItem::action(format!("{PATH_PREFIX}{root}"), root.as_str());
                    if expand_home(root).exists() {
                        item
                    } else {
                        item.with_badge("not found")
                    }
                })
                .collect();
            items.push(MenuItem::action(ADD_PATH_ID, "Add Path..."));

            let Some(selected) = host.choose(&items, "Scan Paths")? else {
                return Ok(());
            };

            if selected.id == ADD_PATH_ID {
                host.notify("Add scan paths under [files] scan_paths in the configuration file");
                continue;
            }

            let Some(root) = selected.id.strip_prefix(PATH_PREFIX) else {
                continue;
            };
            let actions = [MenuItem::action(REMOVE_PATH_ID, "Remove")];
            if let Some(action) = host.choose(&actions, root)?
                && action.id == REMOVE_PATH_ID
            {
                let root = root.to_string();
                self.config.scan.roots.retain(|r| *r != root);
                self.persist(host)?;
                host.notify(&format!("Removed {root}"));
            }
        }
    }

    fn choose_depth(&mut self, host: &mut dyn Host) -> Result<()> {
        let current = self.config.scan.max_depth;
        let items: Vec<MenuItem> = (1..=10)
            .chain(std::iter::once(0))
            .map(|depth| {
                let item = MenuItem::action(format!("{DEPTH_PREFIX}{depth}"), depth_label(depth));
                if depth == current || (depth == 0 && current <= 0) {
                    item.with_badge("current")
                } else {
                    item
                }
            })
            .collect();

        let Some(selected) = host.choose(&items, "Max Depth")? else {
            return Ok(());
        };
        let Some(depth) = selected
            .id
            .strip_prefix(DEPTH_PREFIX)
            .and_then(|d| d.parse::<i64>().ok())
        else {
            return Ok(());
        };

        self.config.scan.max_depth = depth;
        self.persist(host)?;
        host.notify(&format!("Max depth set to {}", depth_label(depth)));
        Ok(())
    }

    fn persist(&self, host: &mut dyn Host) -> Result<()> {
        host.store_blob(CONFIG_KEY, self.config.to_record())
    }

    fn open(&self, host: &mut dyn Host, path: &Path) {
        let result = match &self.opener {
            Some(opener) => opener.open(path),
            None => SystemOpener::from_command(self.config.open_command.as_deref())
                .and_then(|opener| opener.open(path)),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to open {}: {}", path.display(), e);
            host.notify(&format!("Could not open {}: {e}", path.display()));
        }
    }
}

fn depth_label(depth: i64) -> String {
    if depth <= 0 {
        "Unlimited".to_string()
    } else {
        depth.to_string()
    }
}
