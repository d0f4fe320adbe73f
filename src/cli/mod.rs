//! Command-line interface for filescout
//!
//! clap derive definitions and command implementations live in [`commands`];
//! [`Output`] keeps terminal styling consistent across them.

pub mod commands;
mod output;

pub use commands::Cli;
pub use output::Output;
