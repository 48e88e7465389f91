use std::path::PathBuf;

use crate::cli::{Cli, FixPathsCli};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub output_dir: PathBuf,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            output_dir: cli.output_dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FixPathsConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub repo: String,
}

impl From<FixPathsCli> for FixPathsConfig {
    fn from(cli: FixPathsCli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            repo: cli.repo,
        }
    }
}
