use clap::Parser as _;
use tracing::debug;

use gcovr_tree::application::{Application, ApplicationError};
use gcovr_tree::cli::Cli;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    cli_args.log_level.init_tracing();
    debug!("Parsed CLI arguments: {cli_args:?}");

    Application::run(cli_args).await?;

    Ok(())
}
