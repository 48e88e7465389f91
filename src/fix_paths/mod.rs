//! Remapping of boost-root-relative file paths in gcovr JSON reports.
//!
//! gcovr runs from the superproject root, so the paths it records look like
//! `../../libs/json/include/boost/json.hpp`. Rewriting them to
//! `include/boost/json.hpp` before the HTML pass gives a report whose
//! navigation matches the library's own repository layout.

use regex::Regex;
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

/// Keys gcovr uses for a file's path: `filename` in summaries, `file` in full reports
const PATH_KEYS: [&str; 2] = ["filename", "file"];

/// Rewrites paths for one library of the superproject.
#[derive(Debug, Clone)]
pub struct PathFixer {
    repo: String,
    include: Regex,
    src: Regex,
    library: Regex,
    public_headers: Regex,
}

impl PathFixer {
    pub fn new(repo: impl Into<String>) -> Result<Self, PathFixerError> {
        let repo = repo.into();
        let escaped = regex::escape(&repo);
        let compile = |pattern: String| Regex::new(&pattern).context(PatternSnafu { repo: repo.clone() });

        Ok(PathFixer {
            include: compile(format!("^libs/{escaped}/include/(.*)"))?,
            src: compile(format!("^libs/{escaped}/src/(.*)"))?,
            library: compile(format!("^libs/{escaped}/(.*)"))?,
            public_headers: compile(format!("^boost/{escaped}/(.*)"))?,
            repo,
        })
    }

    /// Maps a single path from the superproject layout to the repository layout.
    pub fn fix_path(&self, path: &str) -> String {
        let mut path = path;
        while let Some(rest) = path.strip_prefix("../") {
            path = rest;
        }

        if let Some(rest) = capture(&self.include, path) {
            return format!("include/{rest}");
        }
        if let Some(rest) = capture(&self.src, path) {
            return format!("src/{rest}");
        }
        if let Some(rest) = capture(&self.library, path) {
            return rest.to_string();
        }
        if let Some(rest) = capture(&self.public_headers, path) {
            return format!("include/boost/{}/{rest}", self.repo);
        }
        if path.strip_prefix("boost/") == Some(self.repo.as_str()) {
            return format!("include/boost/{}", self.repo);
        }
        path.to_string()
    }

    /// Rewrites the paths of every entry of the report's `files` array in place.
    ///
    /// Returns the number of entries in `files`.
    pub fn fix_report(&self, report: &mut Value) -> usize {
        let Some(files) = report.get_mut("files").and_then(Value::as_array_mut) else {
            warn!("no 'files' key in JSON");
            return 0;
        };

        for entry in files.iter_mut() {
            for key in PATH_KEYS {
                if let Some(Value::String(path)) = entry.get_mut(key) {
                    let fixed = self.fix_path(path);
                    debug!("{} -> {}", path, fixed);
                    *path = fixed;
                }
            }
        }
        files.len()
    }
}

fn capture<'a>(pattern: &Regex, path: &'a str) -> Option<&'a str> {
    pattern
        .captures(path)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Snafu)]
pub enum PathFixerError {
    #[snafu(display("Cannot build path patterns for repository '{}'", repo))]
    PatternError { repo: String, source: regex::Error },
}
