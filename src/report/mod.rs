//! Reading and updating a gcovr HTML output directory.

mod injection;
mod report_directory;

pub use injection::{TREE_DATA_VARIABLE, inject_tree_script, tree_script};
pub use report_directory::{PageError, ReportDirectory, ReportDirectoryError};
