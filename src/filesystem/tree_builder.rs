use std::collections::HashSet;

use hashlink::LinkedHashMap;
use tracing::{debug, warn};

use super::path_normalizer::{canonical_path, display_name, is_directory};
use super::tree::{CoverageTree, TreeNode};
use crate::listing::{ListingPage, RawEntry};

/// The listing page at the top of every gcovr report
pub const ROOT_LISTING: &str = "index.html";

/// Reassembles the flat listing pages of a report into one nested tree.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    pages: LinkedHashMap<String, ListingPage>,
}

impl TreeBuilder {
    pub fn new(pages: impl IntoIterator<Item = ListingPage>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| (page.id.clone(), page))
            .collect();
        TreeBuilder { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Builds the tree starting from [`ROOT_LISTING`].
    pub fn build(&self) -> CoverageTree {
        self.build_from(ROOT_LISTING)
    }

    pub fn build_from(&self, root_page: &str) -> CoverageTree {
        if !self.pages.contains_key(root_page) {
            warn!("Root listing '{}' not found, the tree will be empty", root_page);
        }

        let mut root = TreeNode::root();
        self.expand_page(root_page, &mut root, HashSet::new());
        root.sort_recursive();

        let tree = CoverageTree::from_root(root);
        debug!("Built tree with {} root entries", tree.len());
        tree
    }

    /// Upserts every entry of `page_id` below `target`, descending into linked pages.
    ///
    /// `visited` holds the pages on the current descent path only; each
    /// branch gets its own copy so siblings never block each other.
    fn expand_page(&self, page_id: &str, target: &mut TreeNode, mut visited: HashSet<String>) {
        if !visited.insert(page_id.to_string()) {
            debug!(
                "Listing '{}' already visited below '{}', not descending again",
                page_id, target.full_path
            );
            return;
        }

        let Some(page) = self.pages.get(page_id) else {
            return;
        };
        debug!(
            "Expanding listing '{}' ({} entries) at '{}'",
            page_id,
            page.entries.len(),
            target.full_path
        );

        for entry in &page.entries {
            let Some(node) = self.attach_entry(entry, target) else {
                continue;
            };

            if !node.is_directory {
                continue;
            }
            let Some(link) = node.link.as_deref().map(listing_id) else {
                continue;
            };
            if self.pages.contains_key(link) {
                let link = link.to_string();
                self.expand_page(&link, node, visited.clone());
            }
        }
    }

    fn attach_entry<'t>(&self, entry: &RawEntry, target: &'t mut TreeNode) -> Option<&'t mut TreeNode> {
        let canonical = canonical_path(&entry.name);
        let Some(relative) = relative_to(&canonical, &target.full_path) else {
            debug!("Skipping '{}', it names the listing's own directory", entry.name);
            return None;
        };

        let name = display_name(&canonical);
        let node = TreeNode::new(
            name,
            target.child_path(relative),
            entry.coverage.as_str(),
            is_directory(name, entry.is_directory),
            entry.link.clone(),
        );

        match target.try_upsert(relative, node) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Failed to insert '{}': {}", entry.name, e);
                None
            }
        }
    }
}

/// Position of `canonical` below `base`.
///
/// Paths already spelled from the report root lose the `base` prefix; any
/// other path is taken as relative to `base`. A path equal to `base` names
/// the directory itself and has no position below it.
fn relative_to<'a>(canonical: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return Some(canonical);
    }
    if canonical == base {
        return None;
    }
    Some(
        canonical
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(canonical),
    )
}

/// Page a link points at, without fragment or query.
fn listing_id(link: &str) -> &str {
    link.split(['#', '?']).next().unwrap_or(link)
}
