mod cli;
mod fix_paths_cli;

pub use cli::Cli;
pub use fix_paths_cli::FixPathsCli;
