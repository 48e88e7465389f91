use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Builds the navigation tree of a gcovr HTML report and embeds it into every page.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// The gcovr HTML output directory
    pub output_dir: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
