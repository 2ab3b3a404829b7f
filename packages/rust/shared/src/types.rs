//! Core domain types: extracted records, raw source documents, the header row.

use serde::{Deserialize, Deserializer, Serialize};

/// Column names written as row 1 of every synchronized sheet.
///
/// Order matches [`Record::to_row`]. A sheet whose first row differs from
/// this sequence in any way is wiped before syncing.
pub const HEADER_ROW: [&str; 7] = [
    "Correspondent Email",
    "Phone",
    "Correspondent",
    "Date Cancelled",
    "US Serial Number",
    "Mark",
    "Goods & Services Description",
];

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One trademark cancellation entry.
///
/// Every field is a plain string; an absent value is the empty string so that
/// exported rows always have seven cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    pub correspondent_email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    /// Correspondent name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub correspondent: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_cancelled: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub us_serial_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mark: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub goods_services: String,
}

impl Record {
    /// Cells in [`HEADER_ROW`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.correspondent_email.clone(),
            self.phone.clone(),
            self.correspondent.clone(),
            self.date_cancelled.clone(),
            self.us_serial_number.clone(),
            self.mark.clone(),
            self.goods_services.clone(),
        ]
    }

    /// True when every field is empty.
    pub fn is_blank(&self) -> bool {
        self.to_row().iter().all(String::is_empty)
    }
}

/// Accepts strings, `null`, and bare scalars; everything becomes a `String`.
///
/// Model output is not always well-typed (`"us_serial_number": 86234567`).
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// RawDocument
// ---------------------------------------------------------------------------

/// Unparsed source content as handed over by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// The query this document was retrieved for.
    pub query: String,
    /// Text or markup; opaque to everything but the field extractor.
    pub content: String,
    /// Where the document came from (file path, sample slot). Logging only.
    pub origin: Option<String>,
}

impl RawDocument {
    pub fn new(query: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            content: content.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_follows_header_order() {
        let record = Record {
            correspondent_email: "a@b.com".into(),
            phone: "555-123-4567".into(),
            correspondent: "A B".into(),
            date_cancelled: "2015-07-02".into(),
            us_serial_number: "86234567".into(),
            mark: "MARK".into(),
            goods_services: "Software".into(),
        };
        let row = record.to_row();
        assert_eq!(row.len(), HEADER_ROW.len());
        assert_eq!(row[0], "a@b.com");
        assert_eq!(row[4], "86234567");
        assert_eq!(row[6], "Software");
    }

    #[test]
    fn missing_and_null_fields_become_empty() {
        let json = r#"{"mark": "CLOUD CONNECT", "phone": null}"#;
        let record: Record = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.mark, "CLOUD CONNECT");
        assert_eq!(record.phone, "");
        assert_eq!(record.correspondent_email, "");
        assert!(!record.is_blank());
    }

    #[test]
    fn numeric_fields_are_stringified() {
        let json = r#"{"us_serial_number": 86234567, "extra": "ignored"}"#;
        let record: Record = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.us_serial_number, "86234567");
    }

    #[test]
    fn default_record_is_blank() {
        assert!(Record::default().is_blank());
        assert_eq!(Record::default().to_row(), vec![String::new(); 7]);
    }

    #[test]
    fn raw_document_origin() {
        let doc = RawDocument::new("DEMO", "body").with_origin("demo#1");
        assert_eq!(doc.query, "DEMO");
        assert_eq!(doc.origin.as_deref(), Some("demo#1"));
    }
}
