//! Post-processing for gcovr HTML coverage reports.
//!
//! The main tool rebuilds the directory tree of a report from its flat
//! per-directory listing pages and embeds it into every page, so the
//! sidebar can offer inline expand and collapse even over `file://`.
//! A second tool rewrites superproject-relative paths in gcovr JSON reports.

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod filesystem;
pub mod fix_paths;
pub mod listing;
pub mod report;
