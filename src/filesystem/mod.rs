//! Coverage tree representation and its assembly from listing pages.
//!
//! Listing pages describe one directory each, with entry names that may be
//! spelled relative to the page, to the report root, or with `../` prefixes.
//! This module normalizes those names and folds all pages into a single
//! tree of [`TreeNode`]s keyed by path.

mod path_normalizer;
mod tree;
mod tree_builder;

pub use path_normalizer::{UNKNOWN_NAME, canonical_path, display_name, is_directory};
pub use tree::{CannotInsertIntoFileError, CoverageTree, TreeNode};
pub use tree_builder::{ROOT_LISTING, TreeBuilder};
