//! Deterministic pattern-based extraction.
//!
//! Only contact details and the serial number are reachable this way; the
//! remaining fields stay empty.

use std::sync::LazyLock;

use regex::Regex;

use marksync_shared::Record;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("valid regex"));

/// `(555) 123-4567`, `555.123.4567`, `555 123 4567`, `555-123-4567`, `5551234567`.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid regex")
});

static SERIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Serial\s*Number[:\s]+(\d{8})").expect("valid regex")
});

/// Run every pattern independently over `text`, first match wins per field.
pub fn extract(text: &str) -> Record {
    let mut record = Record::default();

    if let Some(m) = EMAIL_RE.find(text) {
        record.correspondent_email = m.as_str().to_string();
    }

    if let Some(m) = PHONE_RE.find(text) {
        record.phone = m.as_str().to_string();
    }

    if let Some(serial) = SERIAL_RE.captures(text).and_then(|c| c.get(1)) {
        record.us_serial_number = serial.as_str().to_string();
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_three_patterns() {
        let text = "<p>Correspondent: John Smith</p>\n\
                    <p>Email: john.smith@lawfirm.com</p>\n\
                    <p>Phone: (555) 123-4567</p>\n\
                    <p>US Serial Number: 86234567</p>";
        let record = extract(text);
        assert_eq!(record.correspondent_email, "john.smith@lawfirm.com");
        assert_eq!(record.phone, "(555) 123-4567");
        assert_eq!(record.us_serial_number, "86234567");
        // Name-like fields are never filled here
        assert_eq!(record.correspondent, "");
        assert_eq!(record.mark, "");
        assert_eq!(record.date_cancelled, "");
        assert_eq!(record.goods_services, "");
    }

    #[test]
    fn no_matches_yields_blank_record() {
        let record = extract("Nothing to see here. Mark: CLOUD CONNECT.");
        assert!(record.is_blank());
    }

    #[test]
    fn phone_separator_variants() {
        for phone in ["555.234.5678", "555 234 5678", "555-234-5678", "(555)234-5678"] {
            let record = extract(&format!("call {phone} today"));
            assert_eq!(record.phone, phone, "variant {phone}");
        }
    }

    #[test]
    fn first_email_wins() {
        let record = extract("a.first@one.com then b.second@two.org");
        assert_eq!(record.correspondent_email, "a.first@one.com");
    }

    #[test]
    fn serial_label_is_case_insensitive() {
        let record = extract("serial number: 86345678");
        assert_eq!(record.us_serial_number, "86345678");

        let record = extract("SERIALNUMBER 86456789");
        assert_eq!(record.us_serial_number, "86456789");
    }

    #[test]
    fn serial_requires_label() {
        let record = extract("Registration 86345678 was cancelled");
        assert_eq!(record.us_serial_number, "");
    }
}
