use clap::Parser as _;
use tracing::debug;

use gcovr_tree::application::{FixPathsApplication, FixPathsError};
use gcovr_tree::cli::FixPathsCli;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), FixPathsError> {
    let cli_args = FixPathsCli::parse();
    cli_args.log_level.init_tracing();
    debug!("Parsed CLI arguments: {cli_args:?}");

    FixPathsApplication::run(cli_args).await?;

    Ok(())
}
