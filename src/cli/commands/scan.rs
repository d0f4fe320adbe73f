use anyhow::Result;
use clap::Args;
use console::style;
use serde_json::{Value, json};
use std::io::Write;

use crate::cli::Output;
use crate::config::FilescoutConfig;
use crate::scanner::{BackendPreference, ScanOptions, ScanReport, Scanner};
use crate::utils::abbreviate_home;

#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Root directories to scan (defaults to the configured scan paths)
    #[arg(value_name = "ROOT")]
    pub roots: Vec<String>,

    /// Maximum depth below each root (0 or less for unlimited)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_depth: Option<i64>,

    /// Only list files with these extensions (comma-separated)
    #[arg(long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Directory or file names to prune (comma-separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Stop after this many files
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_files: Option<i64>,

    /// Traversal backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendPreference>,

    /// Time limit for each delegate invocation
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show statistics after scanning
    #[arg(long)]
    pub stats: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// Report as a JSON document
    Json,
    /// One absolute path per line
    Paths,
}

impl ScanArgs {
    /// Layer shape of the flags; unset flags are pruned before merging
    fn overrides(&self) -> Value {
        json!({
            "files": {
                "scan_paths": self.roots,
                "max_depth": self.max_depth,
                "include_extensions": self.extensions,
                "exclude_patterns": self.exclude,
                "max_files": self.max_files,
            },
            "scan": {
                "backend": self.backend,
                "delegate_timeout_secs": self.timeout_secs,
            }
        })
    }
}

pub async fn execute(args: ScanArgs, output: &Output, config_path: Option<&str>) -> Result<()> {
    let config = FilescoutConfig::load(config_path, Some(args.overrides()))?;
    let scan_config = config.scan_config()?;
    let settings = config.scan_settings()?;

    let scanner = Scanner::new(scan_config)?.with_options(ScanOptions::from(&settings));

    let spinner = if args.format == OutputFormat::Text {
        Some(output.spinner("Scanning..."))
    } else {
        None
    };
    let report = scanner.scan().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match args.format {
        OutputFormat::Paths => print_paths(&report)?,
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_text(&report, scanner.config().max_files, output),
    }

    if args.format != OutputFormat::Text {
        for diagnostic in &report.diagnostics {
            output.warning(&diagnostic.to_string());
        }
    }

    if args.stats && args.format != OutputFormat::Json {
        print_stats(&report, output);
    }

    Ok(())
}

fn print_paths(report: &ScanReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for path in &report.files {
        out.write_all(path.as_os_str().as_encoded_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn print_json(report: &ScanReport) -> Result<()> {
    let document = json!({
        "files": report.files.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
        "backend": report.backend,
        "truncated": report.truncated,
        "cancelled": report.cancelled,
        "diagnostics": report.diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        "statistics": report.stats,
    });

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn print_text(report: &ScanReport, max_files: usize, output: &Output) {
    for path in &report.files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let location = path.parent().map(abbreviate_home).unwrap_or_default();
        output.file_entry(&name, &location);
    }

    for diagnostic in &report.diagnostics {
        output.warning(&diagnostic.to_string());
    }
    if report.truncated {
        output.warning(&format!("Stopped at the {max_files} file limit"));
    }

    if report.is_empty() {
        output.info("No files found");
    } else {
        output.success(&format!(
            "Found {} files with the {} backend",
            style(report.len()).cyan(),
            report.backend
        ));
    }
}

fn print_stats(report: &ScanReport, output: &Output) {
    let stats = &report.stats;
    output.category("Scan Statistics");
    output.key_value("Roots configured:", &stats.roots_configured.to_string(), false);
    output.key_value("Roots resolved:", &stats.roots_resolved.to_string(), false);
    output.key_value("Roots scanned:", &stats.roots_scanned.to_string(), false);
    output.key_value("Raw hits:", &stats.raw_hits.to_string(), false);
    output.key_value("Files listed:", &report.len().to_string(), true);
    output.key_value("Scan time:", &format!("{}ms", stats.scan_duration_ms), false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_flags_are_pruned() {
        let overrides = crate::config::overrides::prune_unset(ScanArgs::default().overrides());
        assert_eq!(overrides, json!({}));
    }

    #[test]
    fn test_flags_map_onto_sections() {
        let args = ScanArgs {
            roots: vec!["~/src".into()],
            max_depth: Some(2),
            backend: Some(BackendPreference::Walker),
            ..ScanArgs::default()
        };
        let overrides = crate::config::overrides::prune_unset(args.overrides());
        assert_eq!(
            overrides,
            json!({
                "files": { "scan_paths": ["~/src"], "max_depth": 2 },
                "scan": { "backend": "walker" }
            })
        );
    }
}
