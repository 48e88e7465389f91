mod application;
mod console;
pub mod data;
mod fix_paths_application;
mod runtime_config;

pub use application::{Application, ApplicationError, RunSummary};
pub use fix_paths_application::{FixPathsApplication, FixPathsError};
pub use runtime_config::{FixPathsConfig, RuntimeConfig};
