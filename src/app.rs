use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, expand_home};
use crate::error::Result;
use crate::publish::Git2Collaborator;

pub struct AppContext {
    pub config: Config,
    /// Absolute directory scanned for organizations, after `--base` is applied.
    pub base_path: PathBuf,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let base_path = cli
            .base
            .as_deref()
            .map_or_else(|| config.paths.base.clone(), expand_home);
        // symlink targets are built from this and must be absolute
        let base_path = std::path::absolute(&base_path)?;
        let configured = OutputFormat::parse(&config.output.format)?;

        Ok(Self {
            base_path,
            output_format: cli.output_format(configured),
            verbosity: cli.verbose,
            config,
        })
    }

    #[must_use]
    pub fn is_human(&self) -> bool {
        self.output_format == OutputFormat::Human
    }

    #[must_use]
    pub fn git(&self) -> Git2Collaborator {
        Git2Collaborator::new(self.config.publish.clone())
    }
}
