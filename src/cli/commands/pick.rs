use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::cli::Output;
use crate::config::FilescoutConfig;
use crate::host::{BlobStore, TerminalHost};
use crate::plugin::FilesPlugin;
use crate::plugin::files::PLUGIN_NAME;
use crate::scanner::{BackendPreference, ScanOptions};
use crate::utils::get_config_dir;

#[derive(Args, Debug, Default)]
pub struct PickArgs {
    /// Open the files settings menu instead of the file list
    #[arg(long, conflicts_with = "target")]
    pub settings: bool,

    /// Open this path without showing a menu
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Traversal backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendPreference>,
}

pub async fn execute(args: PickArgs, output: &Output, config_path: Option<&str>) -> Result<()> {
    let overrides = json!({ "scan": { "backend": args.backend } });
    let config = FilescoutConfig::load(config_path, Some(overrides))?;
    let settings = config.scan_settings()?;

    // Stored plugin data wins; the config file only seeds it
    let mut seed = config.files_record();
    if let (Some(command), Value::Object(map)) = (config.open_command(), &mut seed) {
        map.insert("open_command".to_string(), Value::String(command));
    }

    let store = match get_config_dir() {
        Some(dir) => BlobStore::open(dir.join("data.json"))?,
        None => BlobStore::in_memory(),
    };
    let mut host = TerminalHost::new(PLUGIN_NAME, *output, store).with_seed("config", seed);

    let mut plugin = FilesPlugin::new(ScanOptions::from(&settings));
    plugin.setup(&mut host);

    let action = if args.settings {
        "settings"
    } else {
        args.target.as_deref().unwrap_or_default()
    };
    let result = plugin.run(&mut host, action).await;

    plugin.teardown(&mut host);
    result
}
