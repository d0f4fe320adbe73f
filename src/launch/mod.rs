//! Launching external programs without a shell
//!
//! Commands are built as argument vectors from a [`CommandTemplate`] and started
//! detached: null stdio, their own process group, never waited on.

mod template;

pub use template::CommandTemplate;

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("empty command")]
    EmptyCommand,

    #[error("unterminated quote in command: {command}")]
    UnterminatedQuote { command: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Platform file opener template
pub fn default_open_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "open %f"
    } else {
        "xdg-open %f"
    }
}

/// Start `argv` detached and return its process id
pub fn spawn_detached(argv: &[OsString]) -> Result<u32, LaunchError> {
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command.spawn().map_err(|source| LaunchError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;

    tracing::debug!("Started {:?} (pid {})", argv, child.id());
    Ok(child.id())
}

/// Opens a file with whatever the user configured
pub trait Opener: Send + Sync {
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

#[derive(Debug, Clone)]
pub struct SystemOpener {
    template: CommandTemplate,
}

impl SystemOpener {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }

    /// Configured template, or the platform default when none is set
    pub fn from_command(command: Option<&str>) -> Result<Self, LaunchError> {
        let command = command
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(default_open_command());
        Ok(Self::new(CommandTemplate::parse(command)?))
    }

    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }
}

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        let argv = self.template.argv(Some(path.as_os_str()));
        spawn_detached(&argv)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_opener_template() {
        let opener = SystemOpener::from_command(None).unwrap();
        assert_eq!(opener.template().as_str(), default_open_command());

        let blank = SystemOpener::from_command(Some("  ")).unwrap();
        assert_eq!(blank.template().as_str(), default_open_command());
    }

    #[test]
    fn test_configured_opener_template() {
        let opener = SystemOpener::from_command(Some("code --goto %f")).unwrap();
        assert_eq!(opener.template().to_string(), "code --goto %f");
        assert!(SystemOpener::from_command(Some("\"broken")).is_err());
    }

    #[test]
    fn test_spawn_empty_argv() {
        assert!(matches!(spawn_detached(&[]), Err(LaunchError::EmptyCommand)));
    }

    #[test]
    fn test_spawn_missing_program() {
        let argv = vec![OsString::from("filescout-no-such-program-12345")];
        let err = spawn_detached(&argv).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(err.to_string().contains("filescout-no-such-program-12345"));
    }

    #[cfg(unix)]
    #[test]
    fn test_opener_runs_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("opened");
        let opener = SystemOpener::from_command(Some("touch %f")).unwrap();
        opener.open(&marker).unwrap();

        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(marker.exists());
    }
}
