//! Spreadsheet locators.

use std::sync::LazyLock;

use regex::Regex;

use marksync_shared::{MarksyncError, Result};

static SPREADSHEET_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

/// An opaque spreadsheet URL as supplied by the caller.
///
/// Resolution to a spreadsheet ID happens at sync time so a malformed locator
/// surfaces as an [`MarksyncError::InvalidTarget`] from the sync call itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    url: String,
}

impl SyncTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The spreadsheet ID embedded in the URL.
    pub fn spreadsheet_id(&self) -> Result<&str> {
        SPREADSHEET_ID_RE
            .captures(&self.url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| MarksyncError::invalid_target(&self.url))
    }
}

impl std::fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_edit_url() {
        let target = SyncTarget::new(
            "https://docs.google.com/spreadsheets/d/1AbC-d_9xYz/edit#gid=0",
        );
        assert_eq!(target.spreadsheet_id().unwrap(), "1AbC-d_9xYz");
    }

    #[test]
    fn extracts_id_without_suffix() {
        let target = SyncTarget::new("https://docs.google.com/spreadsheets/d/abc123");
        assert_eq!(target.spreadsheet_id().unwrap(), "abc123");
    }

    #[test]
    fn rejects_non_sheet_url() {
        let target = SyncTarget::new("https://docs.google.com/document/d/abc123/edit");
        let err = target.spreadsheet_id().unwrap_err();
        assert!(matches!(err, MarksyncError::InvalidTarget { .. }));
    }

    #[test]
    fn rejects_empty_locator() {
        assert!(SyncTarget::new("").spreadsheet_id().is_err());
    }
}
