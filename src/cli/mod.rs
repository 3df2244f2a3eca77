//! Command-line interface

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

pub use commands::Commands;
pub use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "chaparral",
    version,
    about = "Link an organization's shared skills into its repositories and publish them as a plugin marketplace"
)]
pub struct Cli {
    /// Emit JSON on stdout instead of human-readable text
    #[arg(long, global = true, env = "CHAPARRAL_ROBOT")]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file to use instead of the global one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory containing organizations
    #[arg(long, global = true, value_name = "PATH")]
    pub base: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// `--robot` forces JSON; otherwise `configured` decides.
    #[must_use]
    pub fn output_format(&self, configured: OutputFormat) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            configured
        }
    }
}
