use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::console::highlight;
use crate::filesystem::TreeBuilder;
use crate::report::{ReportDirectory, ReportDirectoryError};

/// What a tree-building run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub tree_path: PathBuf,
    pub root_entries: usize,
    pub injected_pages: usize,
}

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<RunSummary, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        debug!("Runtime config: {:?}", app_config);

        let report = ReportDirectory::open(&app_config.output_dir).context(ReportDirectorySnafu)?;

        let pages = report.read_listings().await.context(ListingSnafu)?;
        let builder = TreeBuilder::new(pages);
        info!("Building tree from {} listing pages", builder.page_count());
        let tree = builder.build();

        let tree_path = report.write_tree(&tree).await.context(TreeWriteSnafu)?;
        println!(
            "Generated {} with {} root entries",
            tree_path.display(),
            highlight(tree.len())
        );

        let injected_pages = report.inject_tree(&tree).await.context(InjectionSnafu)?;
        println!(
            "Injected tree data into {} HTML files",
            highlight(injected_pages)
        );

        Ok(RunSummary {
            tree_path,
            root_entries: tree.len(),
            injected_pages,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Cannot use the report directory"))]
    ReportDirectoryError { source: ReportDirectoryError },
    #[snafu(display("Critical failure encountered while reading listing pages"))]
    ListingError { source: ReportDirectoryError },
    #[snafu(display("Critical failure encountered while writing the tree"))]
    TreeWriteError { source: ReportDirectoryError },
    #[snafu(display("Critical failure encountered while injecting the tree into pages"))]
    InjectionError { source: ReportDirectoryError },
}
