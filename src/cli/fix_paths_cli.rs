use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Rewrites boost-root-relative paths in a gcovr JSON report to repo-relative ones.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct FixPathsCli {
    /// gcovr JSON report to read
    pub input: PathBuf,
    /// Where to write the rewritten report
    pub output: PathBuf,
    /// Boost library the report belongs to (e.g. json, url)
    #[clap(long)]
    pub repo: String,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
