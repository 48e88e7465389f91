//! Scraping of the per-directory listing pages gcovr generates.
//!
//! A listing page enumerates the files and subdirectories of one directory
//! as `file-row` elements. This module turns such a page into an ordered
//! list of [`RawEntry`] rows without interpreting their paths.

mod coverage;
mod parser;
mod raw_entry;

pub use coverage::{CoverageClass, UNKNOWN_COVERAGE, extract_coverage};
pub use parser::{ListingParseError, try_parse_listing};
pub use raw_entry::{ListingPage, RawEntry};
