//! Fixed sample set standing in for live retrieval.
//!
//! Each sample is rendered as a small HTML status page so it goes through the
//! same extraction path as real documents.

use async_trait::async_trait;

use marksync_shared::{RawDocument, Record, Result};

use super::SourceAdapter;

/// (email, phone, correspondent, date cancelled, serial, mark, goods & services)
const SAMPLES: [[&str; 7]; 5] = [
    [
        "john.smith@lawfirm.com",
        "(555) 123-4567",
        "John Smith",
        "2015-07-02",
        "86234567",
        "TECH INNOVATE",
        "Computer software for business analytics and data visualization",
    ],
    [
        "sarah.johnson@legal.com",
        "(555) 234-5678",
        "Sarah Johnson",
        "2015-07-03",
        "86345678",
        "DIGITAL SOLUTIONS",
        "Information technology consultation services and software development",
    ],
    [
        "mike.williams@ip-attorneys.com",
        "(555) 345-6789",
        "Michael Williams",
        "2015-07-04",
        "86456789",
        "SMART HOME PRO",
        "Home automation systems and smart device integration services",
    ],
    [
        "emily.brown@trademarklaw.com",
        "(555) 456-7890",
        "Emily Brown",
        "2015-07-04",
        "86567890",
        "CLOUD CONNECT",
        "Cloud computing services and remote data storage solutions",
    ],
    [
        "david.garcia@legalservices.com",
        "(555) 567-8901",
        "David Garcia",
        "2015-07-05",
        "86678901",
        "MOBILE FIRST",
        "Mobile application development and mobile marketing services",
    ],
];

/// Returns the same five cancellation pages for every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSource;

impl DemoSource {
    /// The structured truth behind the rendered sample pages.
    pub fn sample_records() -> Vec<Record> {
        SAMPLES
            .iter()
            .map(|[email, phone, name, date, serial, mark, goods]| Record {
                correspondent_email: (*email).into(),
                phone: (*phone).into(),
                correspondent: (*name).into(),
                date_cancelled: (*date).into(),
                us_serial_number: (*serial).into(),
                mark: (*mark).into(),
                goods_services: (*goods).into(),
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for DemoSource {
    async fn fetch(&self, query: &str) -> Result<Vec<RawDocument>> {
        Ok(Self::sample_records()
            .iter()
            .enumerate()
            .map(|(i, record)| {
                RawDocument::new(query, render_status_page(record))
                    .with_origin(format!("demo#{}", i + 1))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "demo"
    }
}

fn render_status_page(record: &Record) -> String {
    format!(
        "<html><body><div class=\"status\">\n\
         <h1>{mark}</h1>\n\
         <p>US Serial Number: {serial}</p>\n\
         <p>Status: Cancelled</p>\n\
         <p>Date Cancelled: {date}</p>\n\
         <p>Goods and Services: {goods}</p>\n\
         <h2>Correspondence</h2>\n\
         <p>{name}</p>\n\
         <p>Phone: {phone}</p>\n\
         <p><a href=\"mailto:{email}\">{email}</a></p>\n\
         </div></body></html>",
        mark = record.mark,
        serial = record.us_serial_number,
        date = record.date_cancelled,
        goods = record.goods_services,
        name = record.correspondent,
        phone = record.phone,
        email = record.correspondent_email,
    )
}
