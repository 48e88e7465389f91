/// One row scraped from a listing page, before any path normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Name as written by gcovr, may carry `../` prefixes
    pub name: String,
    pub coverage: String,
    /// Structural hint from the row markup, not authoritative
    pub is_directory: bool,
    pub link: Option<String>,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, coverage: impl Into<String>, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            coverage: coverage.into(),
            is_directory,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// A parsed listing page: its file name and its rows in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPage {
    pub id: String,
    pub entries: Vec<RawEntry>,
}

impl ListingPage {
    pub fn new(id: impl Into<String>, entries: Vec<RawEntry>) -> Self {
        Self {
            id: id.into(),
            entries,
        }
    }
}
