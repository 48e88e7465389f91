use std::path::PathBuf;

use compio::fs;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;

use crate::application::FixPathsConfig;
use crate::application::console::highlight;
use crate::fix_paths::{PathFixer, PathFixerError};

const REPORT_INDENT: &[u8] = b"    ";

pub struct FixPathsApplication;

impl FixPathsApplication {
    /// Rewrites the report at `input` into `output` and returns the number of file entries.
    pub async fn run(app_config: impl Into<FixPathsConfig>) -> Result<usize, FixPathsError> {
        let app_config: FixPathsConfig = app_config.into();
        debug!("Runtime config: {:?}", app_config);

        let fixer = PathFixer::new(&app_config.repo).context(FixerSnafu)?;

        let bytes = fs::read(&app_config.input).await.context(ReadSnafu {
            path: app_config.input.clone(),
        })?;
        let mut report: Value = serde_json::from_slice(&bytes).context(ParseSnafu {
            path: app_config.input.clone(),
        })?;

        let count = fixer.fix_report(&mut report);

        let mut serializer = Serializer::with_formatter(
            Vec::new(),
            PrettyFormatter::with_indent(REPORT_INDENT),
        );
        report.serialize(&mut serializer).context(SerializeSnafu)?;

        fs::write(&app_config.output, serializer.into_inner())
            .await
            .0
            .context(WriteSnafu {
                path: app_config.output.clone(),
            })?;

        println!(
            "Fixed paths for {} files: {} -> {}",
            highlight(count),
            app_config.input.display(),
            app_config.output.display()
        );
        Ok(count)
    }
}

#[derive(Debug, Snafu)]
pub enum FixPathsError {
    #[snafu(display("Invalid repository name"))]
    FixerError { source: PathFixerError },
    #[snafu(display("Failed to read {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not a valid JSON report", path.display()))]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Failed to serialize the rewritten report"))]
    SerializeError { source: serde_json::Error },
    #[snafu(display("Failed to write {}", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}
