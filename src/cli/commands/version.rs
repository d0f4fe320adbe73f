//! Version command implementation

use crate::cli::Output;
use crate::scanner::probe_delegate;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct VersionArgs {}

/// Execute the version command
pub async fn execute(_args: VersionArgs, output: &Output) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    output.header(&format!("{name} v{version}"));
    output.key_value("Description:", description, false);

    output.category("Build Information");
    output.key_value("Rust edition:", "2024", false);
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value(
        "Profile:",
        if cfg!(debug_assertions) { "debug" } else { "release" },
        false,
    );

    output.category("Backends");
    let programs = ["fd".to_string(), "fdfind".to_string()];
    match probe_delegate(&programs) {
        Some(program) => output.key_value("Delegate:", &program.display().to_string(), true),
        None => output.key_value("Delegate:", "not installed (walker only)", false),
    }

    output.blank_line();
    Ok(())
}
