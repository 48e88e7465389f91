use hashlink::LinkedHashMap;
use hashlink::linked_hash_map::Entry;
use serde::{Serialize, Serializer};
use snafu::Snafu;

use crate::listing::{CoverageClass, UNKNOWN_COVERAGE};

/// A reconciled file or directory of the coverage tree.
///
/// Children are keyed by their display name so that data arriving from
/// several listing pages lands on the same node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub full_path: String,
    pub coverage: String,
    pub coverage_class: CoverageClass,
    pub is_directory: bool,
    pub link: Option<String>,
    #[serde(serialize_with = "serialize_children")]
    pub children: LinkedHashMap<String, TreeNode>,
}

impl TreeNode {
    pub fn new(
        name: impl Into<String>,
        full_path: impl Into<String>,
        coverage: impl Into<String>,
        is_directory: bool,
        link: Option<String>,
    ) -> Self {
        let coverage = coverage.into();
        TreeNode {
            name: name.into(),
            full_path: full_path.into(),
            coverage_class: CoverageClass::from_coverage(&coverage),
            coverage,
            is_directory,
            link,
            children: LinkedHashMap::new(),
        }
    }

    /// The unnamed directory all root-level entries hang from.
    pub fn root() -> Self {
        Self::placeholder("", "")
    }

    /// An intermediate directory that nothing has described yet.
    pub fn placeholder(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self::new(name, full_path, UNKNOWN_COVERAGE, true, None)
    }

    /// Path of a direct child called `name`.
    pub fn child_path(&self, name: &str) -> String {
        if self.full_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.full_path, name)
        }
    }

    /// Inserts `incoming` at the slash-separated `relative` path below this node.
    ///
    /// Missing intermediate directories are created as placeholders. When a
    /// node already exists at the final position the incoming data is merged
    /// into it and its children are kept. Returns the inserted or merged node.
    pub fn try_upsert(
        &mut self,
        relative: &str,
        incoming: TreeNode,
    ) -> Result<&mut TreeNode, CannotInsertIntoFileError> {
        let mut segments = relative.split('/').peekable();
        let mut current = self;

        while let Some(segment) = segments.next() {
            if !current.is_directory {
                return Err(CannotInsertIntoFileError {
                    path: current.full_path.clone(),
                });
            }

            if segments.peek().is_none() {
                let node = match current.children.entry(segment.to_string()) {
                    Entry::Occupied(occupied) => {
                        let existing = occupied.into_mut();
                        existing.merge_from(incoming);
                        existing
                    }
                    Entry::Vacant(vacant) => vacant.insert(incoming),
                };
                return Ok(node);
            }

            let child_path = current.child_path(segment);
            current = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::placeholder(segment, child_path));
        }

        Err(CannotInsertIntoFileError {
            path: relative.to_string(),
        })
    }

    /// Overwrites this node's attributes with `incoming`, merging children by name.
    fn merge_from(&mut self, incoming: TreeNode) {
        let TreeNode {
            name,
            full_path,
            coverage,
            coverage_class,
            is_directory,
            link,
            children,
        } = incoming;

        self.name = name;
        self.full_path = full_path;
        self.coverage = coverage;
        self.coverage_class = coverage_class;
        self.link = link;
        // Anything holding children is a directory
        self.is_directory = is_directory || !self.children.is_empty() || !children.is_empty();

        for (child_name, child) in children {
            match self.children.entry(child_name) {
                Entry::Occupied(mut occupied) => occupied.get_mut().merge_from(child),
                Entry::Vacant(vacant) => {
                    vacant.insert(child);
                }
            }
        }
    }

    /// Orders every level: directories first, then case-insensitively by name.
    pub fn sort_recursive(&mut self) {
        let mut children: Vec<(String, TreeNode)> =
            std::mem::take(&mut self.children).into_iter().collect();
        children.sort_by_cached_key(|(_, child)| (!child.is_directory, child.name.to_lowercase()));

        for (_, child) in children.iter_mut() {
            child.sort_recursive();
        }
        self.children = children.into_iter().collect();
    }

    pub fn find(&self, full_path: &str) -> Option<&TreeNode> {
        let relative = if self.full_path.is_empty() {
            full_path
        } else {
            full_path.strip_prefix(&self.full_path)?.strip_prefix('/')?
        };

        relative
            .split('/')
            .try_fold(self, |node, segment| node.children.get(segment))
    }
}

fn serialize_children<S: Serializer>(
    children: &LinkedHashMap<String, TreeNode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(children.values())
}

/// The assembled tree. Serializes as the list of root-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTree {
    root: TreeNode,
}

impl CoverageTree {
    pub fn from_root(root: TreeNode) -> Self {
        CoverageTree { root }
    }

    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.root.children.values()
    }

    pub fn len(&self) -> usize {
        self.root.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    pub fn find(&self, full_path: &str) -> Option<&TreeNode> {
        self.root.find(full_path)
    }
}

impl Default for CoverageTree {
    fn default() -> Self {
        CoverageTree::from_root(TreeNode::root())
    }
}

impl Serialize for CoverageTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.roots())
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Cannot insert below '{}', it is a file", path))]
pub struct CannotInsertIntoFileError {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, full_path: &str, coverage: &str) -> TreeNode {
        TreeNode::new(name, full_path, coverage, false, None)
    }

    fn dir(name: &str, full_path: &str, coverage: &str, link: &str) -> TreeNode {
        TreeNode::new(name, full_path, coverage, true, Some(link.to_string()))
    }

    fn names(node: &TreeNode) -> Vec<&str> {
        node.children.values().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn deep_insert_creates_placeholders() {
        let mut root = TreeNode::root();

        root.try_upsert("a/b/c.cpp", file("c.cpp", "a/b/c.cpp", "50"))
            .unwrap();

        let a = &root.children["a"];
        assert!(a.is_directory);
        assert_eq!(a.full_path, "a");
        assert_eq!(a.coverage, UNKNOWN_COVERAGE);
        assert_eq!(a.coverage_class, CoverageClass::Unknown);
        let b = &a.children["b"];
        assert_eq!(b.full_path, "a/b");
        assert_eq!(b.children["c.cpp"].full_path, "a/b/c.cpp");
    }

    #[test]
    fn later_directory_data_upgrades_placeholder() {
        let mut root = TreeNode::root();
        root.try_upsert("a/b/c.cpp", file("c.cpp", "a/b/c.cpp", "50"))
            .unwrap();

        let b = root
            .try_upsert("a/b", dir("b", "a/b", "91.0", "index.a_b.html"))
            .unwrap();

        assert_eq!(b.coverage, "91.0");
        assert_eq!(b.coverage_class, CoverageClass::High);
        assert_eq!(b.link.as_deref(), Some("index.a_b.html"));
        assert_eq!(names(b), vec!["c.cpp"]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children["a"].children.len(), 1);
    }

    #[test]
    fn merging_a_file_entry_keeps_existing_children_as_directory() {
        let mut root = TreeNode::root();
        root.try_upsert("x/y.cpp", file("y.cpp", "x/y.cpp", "1"))
            .unwrap();

        let x = root.try_upsert("x", file("x", "x", "20")).unwrap();

        assert!(x.is_directory);
        assert_eq!(names(x), vec!["y.cpp"]);
    }

    #[test]
    fn inserting_below_a_file_fails() {
        let mut root = TreeNode::root();
        root.try_upsert("main.cpp", file("main.cpp", "main.cpp", "1"))
            .unwrap();

        let result = root.try_upsert("main.cpp/inner.cpp", file("inner.cpp", "main.cpp/inner.cpp", "1"));

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().path, "main.cpp");
    }

    #[test]
    fn siblings_sort_directories_first_then_case_insensitive() {
        let mut root = TreeNode::root();
        root.try_upsert("Zeta", file("Zeta", "Zeta", "1")).unwrap();
        root.try_upsert("alpha", dir("alpha", "alpha", "1", "index.alpha.html"))
            .unwrap();
        root.try_upsert("beta", file("beta", "beta", "1")).unwrap();

        root.sort_recursive();

        assert_eq!(names(&root), vec!["alpha", "beta", "Zeta"]);
    }

    #[test]
    fn sorting_reaches_every_level() {
        let mut root = TreeNode::root();
        root.try_upsert("d/z.cpp", file("z.cpp", "d/z.cpp", "1")).unwrap();
        root.try_upsert("d/B.cpp", file("B.cpp", "d/B.cpp", "1")).unwrap();
        root.try_upsert("d/sub/a.cpp", file("a.cpp", "d/sub/a.cpp", "1"))
            .unwrap();

        root.sort_recursive();

        assert_eq!(names(&root.children["d"]), vec!["sub", "B.cpp", "z.cpp"]);
    }

    #[test]
    fn find_walks_full_paths() {
        let mut root = TreeNode::root();
        root.try_upsert("a/b/c.cpp", file("c.cpp", "a/b/c.cpp", "1"))
            .unwrap();
        let tree = CoverageTree::from_root(root);

        assert_eq!(tree.find("a/b/c.cpp").map(|n| n.name.as_str()), Some("c.cpp"));
        assert_eq!(tree.find("a/b").map(|n| n.full_path.as_str()), Some("a/b"));
        assert!(tree.find("a/x").is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn serializes_with_viewer_keys() {
        let mut root = TreeNode::root();
        root.try_upsert("src", dir("src", "src", "80", "index.src.html"))
            .unwrap();
        root.try_upsert("src/a.cpp", file("a.cpp", "src/a.cpp", "92.5"))
            .unwrap();
        let tree = CoverageTree::from_root(root);

        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "name": "src",
                "fullPath": "src",
                "coverage": "80",
                "coverageClass": "coverage-medium",
                "isDirectory": true,
                "link": "index.src.html",
                "children": [{
                    "name": "a.cpp",
                    "fullPath": "src/a.cpp",
                    "coverage": "92.5",
                    "coverageClass": "coverage-high",
                    "isDirectory": false,
                    "link": null,
                    "children": []
                }]
            }])
        );
    }

    #[test]
    fn empty_tree_serializes_as_empty_list() {
        let tree = CoverageTree::default();

        assert!(tree.is_empty());
        assert_eq!(serde_json::to_string(&tree).unwrap(), "[]");
    }
}
