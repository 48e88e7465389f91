use std::borrow::Cow;
use std::sync::LazyLock;

use hashlink::LinkedHashMap;
use regex::Regex;
use snafu::Snafu;
use tracing::{debug, warn};

use super::coverage::extract_coverage;
use super::raw_entry::{ListingPage, RawEntry};

const ROW_CLASS: &str = "file-row";
const DIRECTORY_CLASS: &str = "directory";
const COVERAGE_PERCENT_CLASS: &str = "coverage-percent";
const DEFAULT_COVERAGE: &str = "0";

/// Elements whose content is never markup
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#)
        .expect("attribute pattern is valid")
});

impl ListingPage {
    /// Parses a listing page, degrading to an empty page when the document is malformed.
    pub fn parse(id: impl Into<String>, content: &str) -> Self {
        let id = id.into();
        let entries = match try_parse_listing(content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring malformed listing page '{}': {}", id, e);
                Vec::new()
            }
        };
        debug!("Listing page '{}' has {} entries", id, entries.len());
        ListingPage { id, entries }
    }
}

/// Extracts the file rows of a gcovr listing page in document order.
pub fn try_parse_listing(content: &str) -> Result<Vec<RawEntry>, ListingParseError> {
    let mut parser = ListingParser::default();
    let bytes = content.as_bytes();
    let mut pos = 0;

    while pos < content.len() {
        let Some(lt) = content[pos..].find('<').map(|i| i + pos) else {
            parser.handle_data(&content[pos..]);
            break;
        };
        if lt > pos {
            parser.handle_data(&content[pos..lt]);
        }

        let rest = &content[lt..];
        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or(ListingParseError::UnterminatedComment { offset: lt })?;
            pos = lt + end + "-->".len();
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .ok_or(ListingParseError::UnterminatedTag { offset: lt })?;
            pos = lt + end + 1;
            continue;
        }

        let starts_tag = rest[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/');
        if !starts_tag {
            // A bare `<` in text
            parser.handle_data("<");
            pos = lt + 1;
            continue;
        }

        let gt = find_tag_end(bytes, lt + 1).ok_or(ListingParseError::UnterminatedTag { offset: lt })?;
        let body = &content[lt + 1..gt];
        pos = gt + 1;

        if let Some(closing) = body.strip_prefix('/') {
            let name = closing
                .split(|c: char| c.is_whitespace())
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            parser.handle_endtag(&name);
            continue;
        }

        let (name, attrs, self_closing) = parse_start_tag(body);
        parser.handle_starttag(&name, &attrs, self_closing);

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            pos = skip_raw_text(content, pos, &name)?;
        }
    }

    parser.finish()
}

/// Row-level state machine fed with tokens by [`try_parse_listing`].
#[derive(Debug, Default)]
struct ListingParser {
    entries: Vec<RawEntry>,
    row: Option<OpenRow>,
    capture_coverage: bool,
}

#[derive(Debug)]
struct OpenRow {
    entry: RawEntry,
    /// Number of `div`s open inside the row, the row's own included
    depth: usize,
}

impl ListingParser {
    fn handle_starttag(
        &mut self,
        tag: &str,
        attrs: &LinkedHashMap<String, String>,
        self_closing: bool,
    ) {
        let class = attrs.get("class").map(String::as_str).unwrap_or_default();

        if tag == "div" {
            if let Some(row) = &mut self.row {
                if !self_closing {
                    row.depth += 1;
                }
            } else if has_class(class, ROW_CLASS) {
                let name = attrs.get("data-filename").cloned().unwrap_or_default();
                let coverage = attrs
                    .get("data-coverage")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_COVERAGE.to_string());
                let is_directory = has_class(class, DIRECTORY_CLASS);
                self.row = Some(OpenRow {
                    entry: RawEntry::new(name, coverage, is_directory),
                    depth: 1,
                });
                if self_closing {
                    self.handle_endtag("div");
                }
                return;
            }
        }

        let Some(row) = &mut self.row else {
            return;
        };

        if tag == "a" && row.entry.link.is_none() {
            if let Some(href) = attrs.get("href").filter(|href| !href.is_empty()) {
                row.entry.link = Some(href.clone());
            }
        }

        if class.contains(COVERAGE_PERCENT_CLASS) {
            self.capture_coverage = true;
        }
    }

    fn handle_data(&mut self, data: &str) {
        if !self.capture_coverage {
            return;
        }
        // Only the first chunk counts, even when blank
        self.capture_coverage = false;

        if let Some(row) = &mut self.row {
            if let Some(coverage) = extract_coverage(&unescape(data)) {
                row.entry.coverage = coverage;
            }
        }
    }

    fn handle_endtag(&mut self, tag: &str) {
        if tag != "div" {
            return;
        }
        let Some(row) = &mut self.row else {
            return;
        };

        row.depth -= 1;
        if row.depth > 0 {
            return;
        }

        if let Some(row) = self.row.take() {
            if row.entry.name.is_empty() {
                debug!("Dropping listing row without a file name");
            } else {
                self.entries.push(row.entry);
            }
        }
        self.capture_coverage = false;
    }

    fn finish(self) -> Result<Vec<RawEntry>, ListingParseError> {
        match self.row {
            Some(row) => Err(ListingParseError::UnterminatedRow {
                name: row.entry.name,
            }),
            None => Ok(self.entries),
        }
    }
}

fn has_class(class_attr: &str, class: &str) -> bool {
    class_attr.split_whitespace().any(|c| c == class)
}

/// Finds the `>` closing a tag, ignoring any inside quoted attribute values.
///
/// A quote only opens a value right after `=`; elsewhere it is an ordinary character.
fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote = None;
    let mut after_equals = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'>' => return Some(i),
            None if after_equals && (b == b'"' || b == b'\'') => {
                quote = Some(b);
                after_equals = false;
            }
            None if b == b'=' => after_equals = true,
            None if b.is_ascii_whitespace() => {}
            None => after_equals = false,
        }
    }
    None
}

fn parse_start_tag(body: &str) -> (String, LinkedHashMap<String, String>, bool) {
    let self_closing = body.trim_end().ends_with('/');
    let body = body.trim_end().trim_end_matches('/');

    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_lowercase();

    let mut attrs = LinkedHashMap::new();
    for captures in ATTRIBUTE.captures_iter(&body[name_end..]) {
        let key = captures[1].to_ascii_lowercase();
        let value = captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))
            .map(|m| unescape(m.as_str()).into_owned())
            .unwrap_or_default();
        // First occurrence wins, as in browsers
        attrs.entry(key).or_insert(value);
    }

    (name, attrs, self_closing)
}

/// Returns the position just past the `</tag>` closing a raw text element.
fn skip_raw_text(content: &str, pos: usize, tag: &str) -> Result<usize, ListingParseError> {
    let lowered = content[pos..].to_ascii_lowercase();
    let close = format!("</{tag}");
    let end = lowered
        .find(&close)
        .and_then(|start| lowered[start..].find('>').map(|gt| start + gt + 1))
        .ok_or_else(|| ListingParseError::UnterminatedRawText {
            tag: tag.to_string(),
        })?;
    Ok(pos + end)
}

fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ListingParseError {
    #[snafu(display("Tag opened at byte {} is never closed", offset))]
    UnterminatedTag { offset: usize },
    #[snafu(display("Comment opened at byte {} is never closed", offset))]
    UnterminatedComment { offset: usize },
    #[snafu(display("Missing closing tag for <{}>", tag))]
    UnterminatedRawText { tag: String },
    #[snafu(display("File row '{}' is still open at the end of the document", name))]
    UnterminatedRow { name: String },
}
