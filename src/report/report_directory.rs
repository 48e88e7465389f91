use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use super::injection::{inject_tree_script, tree_script};
use crate::filesystem::CoverageTree;
use crate::listing::ListingPage;

const TREE_FILE_NAME: &str = "tree.json";
const LISTING_PREFIX: &str = "index";
const HTML_SUFFIX: &str = ".html";

/// A gcovr HTML output directory.
#[derive(Debug, Clone)]
pub struct ReportDirectory {
    path: PathBuf,
}

impl ReportDirectory {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReportDirectoryError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(ReportDirectoryError::NotADirectory { path });
        }
        Ok(ReportDirectory { path })
    }

    pub fn tree_file_path(&self) -> PathBuf {
        self.path.join(TREE_FILE_NAME)
    }

    /// Listing pages (`index*.html`) sorted by file name.
    pub fn listing_paths(&self) -> Result<Vec<PathBuf>, ReportDirectoryError> {
        self.html_files(|name| name.starts_with(LISTING_PREFIX))
    }

    /// Every HTML page of the report sorted by file name.
    pub fn html_paths(&self) -> Result<Vec<PathBuf>, ReportDirectoryError> {
        self.html_files(|_| true)
    }

    fn html_files(
        &self,
        accept: impl Fn(&str) -> bool,
    ) -> Result<Vec<PathBuf>, ReportDirectoryError> {
        let read_dir = std::fs::read_dir(&self.path).context(ListSnafu {
            path: self.path.clone(),
        })?;

        let mut paths = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.context(ListSnafu {
                path: self.path.clone(),
            })?;
            let path = dir_entry.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                debug!("Skipping non UTF-8 file name in {}", self.path.display());
                continue;
            };
            if name.ends_with(HTML_SUFFIX) && accept(name) && path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Reads and parses every listing page. A page that cannot be read becomes an empty listing.
    pub async fn read_listings(&self) -> Result<Vec<ListingPage>, ReportDirectoryError> {
        let paths = self.listing_paths()?;
        info!("Reading {} listing pages", paths.len());

        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            pages.push(read_listing(&path).await);
        }
        Ok(pages)
    }

    /// Writes `tree` as pretty-printed JSON and returns the file written.
    pub async fn write_tree(&self, tree: &CoverageTree) -> Result<PathBuf, ReportDirectoryError> {
        let tree_path = self.tree_file_path();
        let json = serde_json::to_string_pretty(tree).context(SerializeSnafu)?;

        fs::write(&tree_path, json.into_bytes())
            .await
            .0
            .context(WriteTreeSnafu {
                path: tree_path.clone(),
            })?;

        info!("Wrote {}", tree_path.display());
        Ok(tree_path)
    }

    /// Embeds `tree` into every HTML page and returns how many pages changed.
    ///
    /// Failing pages are logged and skipped.
    pub async fn inject_tree(&self, tree: &CoverageTree) -> Result<usize, ReportDirectoryError> {
        let script = tree_script(tree).context(SerializeSnafu)?;

        let mut updated = 0;
        for path in self.html_paths()? {
            match inject_into_page(&path, &script).await {
                Ok(true) => {
                    debug!("Injected tree data into {}", path.display());
                    updated += 1;
                }
                Ok(false) => debug!("{} is already up to date", path.display()),
                Err(e) => warn!("Could not inject into {}: {}", path.display(), e),
            }
        }

        info!("Injected tree data into {} pages", updated);
        Ok(updated)
    }
}

async fn read_listing(path: &Path) -> ListingPage {
    let id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match read_page(path).await {
        Ok(content) => ListingPage::parse(id, &content),
        Err(e) => {
            warn!("Error parsing {}: {}", path.display(), e);
            ListingPage::new(id, Vec::new())
        }
    }
}

async fn read_page(path: &Path) -> Result<String, PageError> {
    let bytes = fs::read(path).await.context(ReadSnafu {
        path: path.to_path_buf(),
    })?;
    String::from_utf8(bytes).context(EncodingSnafu {
        path: path.to_path_buf(),
    })
}

async fn inject_into_page(path: &Path, script: &str) -> Result<bool, PageError> {
    let content = read_page(path).await?;
    let Some(updated) = inject_tree_script(&content, script) else {
        return Ok(false);
    };

    fs::write(path, updated.into_bytes())
        .await
        .0
        .context(WriteSnafu {
            path: path.to_path_buf(),
        })?;
    Ok(true)
}

#[derive(Debug, Snafu)]
pub enum ReportDirectoryError {
    #[snafu(display("{} is not a directory", path.display()))]
    NotADirectory { path: PathBuf },
    #[snafu(display("Failed to list {}", path.display()))]
    ListError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to serialize the coverage tree"))]
    SerializeError { source: serde_json::Error },
    #[snafu(display("Failed to write {}", path.display()))]
    WriteTreeError {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Snafu)]
pub enum PageError {
    #[snafu(display("Failed to read {}: {}", path.display(), source))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not valid UTF-8", path.display()))]
    EncodingError { path: PathBuf, source: FromUtf8Error },
    #[snafu(display("Failed to write {}: {}", path.display(), source))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::TreeBuilder;
    use tempfile::TempDir;

    const ROOT_PAGE: &str = r#"<html><body>
<div class="file-list">
  <div class="file-row directory" data-filename="../../src" data-coverage="80.0"><a href="index.src.html">src</a></div>
  <div class="file-row" data-filename="../../main.cpp" data-coverage="95.0"><a href="index.main.cpp.html">main.cpp</a></div>
</div>
</body></html>"#;

    const SRC_PAGE: &str = r#"<html><body>
<div class="file-row" data-filename="../../src/util.hpp"><span class="coverage-percent">55.5%</span></div>
</body></html>"#;

    fn report_dir() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(dir.path().join("index.html"), ROOT_PAGE).unwrap();
        std::fs::write(dir.path().join("index.src.html"), SRC_PAGE).unwrap();
        std::fs::write(
            dir.path().join("index.main.cpp.html"),
            "<html><body><pre>int main() {}</pre></body></html>",
        )
        .unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        dir
    }

    #[test]
    fn open_rejects_files_and_missing_paths() {
        let dir = report_dir();

        assert!(matches!(
            ReportDirectory::open(dir.path().join("index.html")),
            Err(ReportDirectoryError::NotADirectory { .. })
        ));
        assert!(matches!(
            ReportDirectory::open(dir.path().join("missing")),
            Err(ReportDirectoryError::NotADirectory { .. })
        ));
    }

    #[test]
    fn listing_pages_are_discovered_in_name_order() {
        let dir = report_dir();
        std::fs::write(dir.path().join("other.html"), "<html></html>").unwrap();
        let report = ReportDirectory::open(dir.path()).unwrap();

        let listings: Vec<_> = report
            .listing_paths()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        let html = report.html_paths().unwrap();

        assert_eq!(
            listings,
            vec!["index.html", "index.main.cpp.html", "index.src.html"]
        );
        assert_eq!(html.len(), 4);
    }

    #[compio::test]
    async fn listings_are_read_and_parsed() {
        let dir = report_dir();
        let report = ReportDirectory::open(dir.path()).unwrap();

        let pages = report.read_listings().await.unwrap();

        let root = pages.iter().find(|p| p.id == "index.html").unwrap();
        assert_eq!(root.entries.len(), 2);
        let src = pages.iter().find(|p| p.id == "index.src.html").unwrap();
        assert_eq!(src.entries[0].coverage, "55.5");
    }

    #[compio::test]
    async fn unreadable_listing_becomes_empty() {
        let dir = report_dir();
        std::fs::write(dir.path().join("index.bad.html"), [0xff, 0xfe, 0x00]).unwrap();
        let report = ReportDirectory::open(dir.path()).unwrap();

        let pages = report.read_listings().await.unwrap();

        let bad = pages.iter().find(|p| p.id == "index.bad.html").unwrap();
        assert!(bad.entries.is_empty());
        assert_eq!(pages.len(), 4);
    }

    #[compio::test]
    async fn tree_is_written_as_json() {
        let dir = report_dir();
        let report = ReportDirectory::open(dir.path()).unwrap();
        let tree = TreeBuilder::new(report.read_listings().await.unwrap()).build();

        let tree_path = report.write_tree(&tree).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(tree_path).unwrap()).unwrap();
        assert_eq!(written[0]["name"], "src");
        assert_eq!(written[0]["children"][0]["fullPath"], "src/util.hpp");
        assert_eq!(written[0]["children"][0]["coverageClass"], "coverage-low");
        assert_eq!(written[1]["name"], "main.cpp");
    }

    #[compio::test]
    async fn injection_is_idempotent() {
        let dir = report_dir();
        let report = ReportDirectory::open(dir.path()).unwrap();
        let tree = TreeBuilder::new(report.read_listings().await.unwrap()).build();

        let first = report.inject_tree(&tree).await.unwrap();
        let after_first = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        let second = report.inject_tree(&tree).await.unwrap();
        let after_second = std::fs::read_to_string(dir.path().join("index.html")).unwrap();

        assert_eq!(first, 3);
        assert_eq!(second, 0);
        assert_eq!(after_first, after_second);
        assert_eq!(after_second.matches("window.GCOVR_TREE_DATA=").count(), 1);
    }

    #[compio::test]
    async fn injected_pages_still_parse_to_the_same_listing() {
        let dir = report_dir();
        let report = ReportDirectory::open(dir.path()).unwrap();
        let before = report.read_listings().await.unwrap();
        let tree = TreeBuilder::new(before.clone()).build();

        report.inject_tree(&tree).await.unwrap();
        let after = report.read_listings().await.unwrap();

        assert_eq!(before, after);
        assert_eq!(TreeBuilder::new(after).build(), tree);
    }
}
