use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use std::path::Path;

use crate::cli::Output;
use crate::config::FilescoutConfig;
use crate::config::core::DEFAULT_CONFIG;
use crate::launch::SystemOpener;
use crate::scanner::{expand_home, probe_delegate};

const PROJECT_CONFIG: &str = "filescout.toml";

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a commented default filescout.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Display current merged configuration
    Show {
        /// Output format: toml or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Check that the merged configuration is usable
    Validate,
}

pub async fn execute(args: ConfigArgs, output: &Output, custom_config: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommand::Init { force } => init(Path::new(PROJECT_CONFIG), force, output),
        ConfigCommand::Show { format } => {
            let config = FilescoutConfig::load(custom_config, None::<&()>)?;
            let merged = config.get_full_config()?;
            let rendered = match format.to_lowercase().as_str() {
                "toml" => toml::to_string_pretty(&merged)?,
                "json" => serde_json::to_string_pretty(&merged)?,
                _ => bail!("Unsupported format: {}. Use toml or json", format),
            };
            println!("{rendered}");
            Ok(())
        }
        ConfigCommand::Validate => validate(output, custom_config),
    }
}

fn init(path: &Path, force: bool, output: &Output) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    output.success(&format!("Created {}", path.display()));
    Ok(())
}

fn validate(output: &Output, custom_config: Option<&str>) -> Result<()> {
    let config = FilescoutConfig::load(custom_config, None::<&()>)?;
    let scan = config.scan_config()?;
    scan.validate()?;
    let settings = config.scan_settings()?;
    let opener = SystemOpener::from_command(config.open_command().as_deref())?;

    output.success("Configuration is valid");

    output.category("Scan Paths");
    for root in &scan.roots {
        let found = expand_home(root).is_dir();
        output.key_value(root, if found { "ok" } else { "not found" }, found);
    }

    output.category("Limits");
    let depth = scan
        .depth_limit()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unlimited".to_string());
    output.key_value("Max depth:", &depth, false);
    output.key_value("Max files:", &scan.max_files.to_string(), false);
    if !scan.include_extensions.is_empty() {
        output.key_value("Extensions:", &scan.include_extensions.join(", "), false);
    }
    output.key_value("Excluded:", &scan.exclude_patterns.join(", "), false);

    output.category("Backend");
    output.key_value("Preference:", &format!("{:?}", settings.backend).to_lowercase(), false);
    match probe_delegate(&settings.delegate_programs) {
        Some(program) => output.key_value("Delegate:", &program.display().to_string(), true),
        None => output.key_value("Delegate:", "not installed (walker only)", false),
    }
    output.key_value("Timeout:", &format!("{}s", settings.delegate_timeout().as_secs()), false);
    output.key_value("Open command:", opener.template().as_str(), false);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PROJECT_CONFIG);
        let output = Output::new(0, true);

        init(&path, false, &output).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        std::fs::write(&path, "# edited").unwrap();
        assert!(init(&path, false, &output).is_err());
        init(&path, true, &output).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
