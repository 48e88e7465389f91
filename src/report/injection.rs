use std::sync::LazyLock;

use regex::Regex;

use crate::filesystem::CoverageTree;

/// Global the report's sidebar script reads the tree from
pub const TREE_DATA_VARIABLE: &str = "GCOVR_TREE_DATA";

const BODY_CLOSE: &str = "</body>";

static EMBEDDED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script>window\.GCOVR_TREE_DATA=.*?;</script>")
        .expect("embedded block pattern is valid")
});

/// Renders the inline `<script>` block carrying `tree`.
///
/// `</` is written as `<\/` so that no string inside the data can close the
/// script element early.
pub fn tree_script(tree: &CoverageTree) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(tree)?.replace("</", "<\\/");
    Ok(format!("<script>window.{TREE_DATA_VARIABLE}={json};</script>"))
}

/// Embeds `script` into an HTML page.
///
/// A block left by an earlier run is replaced and any duplicates of it are
/// dropped. Pages without a block get one right before their closing body
/// tag. Returns `None` when the page would not change.
pub fn inject_tree_script(content: &str, script: &str) -> Option<String> {
    let updated = match replace_embedded_blocks(content, script) {
        Some(updated) => updated,
        None => {
            let body_close = content.rfind(BODY_CLOSE)?;
            format!(
                "{}{}\n{}",
                &content[..body_close],
                script,
                &content[body_close..]
            )
        }
    };

    (updated != content).then_some(updated)
}

fn replace_embedded_blocks(content: &str, script: &str) -> Option<String> {
    let mut blocks = EMBEDDED_BLOCK.find_iter(content).peekable();
    blocks.peek()?;

    let mut updated = String::with_capacity(content.len() + script.len());
    let mut last = 0;
    for (index, block) in blocks.enumerate() {
        updated.push_str(&content[last..block.start()]);
        if index == 0 {
            updated.push_str(script);
        }
        last = block.end();
    }
    updated.push_str(&content[last..]);
    Some(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::TreeNode;

    const PAGE: &str = "<html><body><div>listing</div></body></html>";

    fn tree_with(name: &str) -> CoverageTree {
        let mut root = TreeNode::root();
        root.children.insert(
            name.to_string(),
            TreeNode::new(name, name, "50", false, None),
        );
        CoverageTree::from_root(root)
    }

    #[test]
    fn script_embeds_compact_json() {
        let script = tree_script(&CoverageTree::default()).unwrap();

        assert_eq!(script, "<script>window.GCOVR_TREE_DATA=[];</script>");
    }

    #[test]
    fn script_cannot_close_itself_early() {
        let script = tree_script(&tree_with("evil</script>.cpp")).unwrap();

        assert_eq!(script.matches("</script>").count(), 1);
        assert!(script.contains(r"evil<\/script>.cpp"));
    }

    #[test]
    fn block_is_inserted_before_body_close() {
        let updated = inject_tree_script(PAGE, "<script>window.GCOVR_TREE_DATA=[];</script>").unwrap();

        assert_eq!(
            updated,
            "<html><body><div>listing</div><script>window.GCOVR_TREE_DATA=[];</script>\n</body></html>"
        );
    }

    #[test]
    fn injecting_twice_equals_injecting_once() {
        let script = tree_script(&tree_with("a.cpp")).unwrap();

        let once = inject_tree_script(PAGE, &script).unwrap();
        let twice = inject_tree_script(&once, &script);

        assert!(twice.is_none());
        assert_eq!(once.matches("GCOVR_TREE_DATA").count(), 1);
    }

    #[test]
    fn existing_block_is_replaced() {
        let old = inject_tree_script(PAGE, &tree_script(&tree_with("old.cpp")).unwrap()).unwrap();
        let new_script = tree_script(&tree_with("new.cpp")).unwrap();

        let updated = inject_tree_script(&old, &new_script).unwrap();

        assert!(updated.contains("new.cpp"));
        assert!(!updated.contains("old.cpp"));
        assert_eq!(updated.matches("GCOVR_TREE_DATA").count(), 1);
    }

    #[test]
    fn duplicate_blocks_collapse_into_one() {
        let block = "<script>window.GCOVR_TREE_DATA=[1];</script>";
        let page = format!("<html><body>{block}\n{block}\n</body></html>");

        let updated = inject_tree_script(&page, "<script>window.GCOVR_TREE_DATA=[];</script>").unwrap();

        assert_eq!(
            updated,
            "<html><body><script>window.GCOVR_TREE_DATA=[];</script>\n\n</body></html>"
        );
    }

    #[test]
    fn page_without_body_is_untouched() {
        assert!(inject_tree_script("<div>fragment</div>", "<script></script>").is_none());
    }
}
