/// RapidDNS source
///
/// Subdomain enumeration scraped from the HTML results table.
/// Free, no API key.
///
/// URL: https://rapiddns.io/subdomain/{keyword}?full=1
use super::{clean_hostname, fetch_text, host_record};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const BASE_URL: &str = "https://rapiddns.io/subdomain";
const MAX_ROWS: usize = 200;

static ROW_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table tbody tr").expect("row selector"));
static CELL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));

pub struct RapidDnsSource {
    client: Client,
}

impl RapidDnsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn parse_response(&self, body: &str) -> Vec<UrlRecord> {
        let document = Html::parse_document(body);
        let mut records = RecordSet::new();

        // Columns: [# (th)] Domain | Address | Type | Date
        for row in document.select(&ROW_SEL).take(MAX_ROWS) {
            let cells: Vec<String> = row.select(&CELL_SEL).map(cell_text).collect();
            let Some(host) = cells.first().and_then(|c| clean_hostname(c)) else {
                continue;
            };

            let value = cells.get(1).map(String::as_str).unwrap_or_default();
            let kind = cells.get(2).map(String::as_str).unwrap_or_default();
            let info = format!("{} {}", kind, value);

            if let Some(record) = host_record(&host, self.name()) {
                records.push(record.with_info(info));
            }
        }

        records.into_records()
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[async_trait]
impl Source for RapidDnsSource {
    fn name(&self) -> &'static str {
        "rapiddns"
    }

    fn description(&self) -> &'static str {
        "RapidDNS subdomain database, HTML table (free, no API key)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::PassiveDns
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let url = format!(
            "{}/{}",
            BASE_URL,
            urlencoding::encode(&keyword.to_lowercase())
        );
        let request = self.client.get(url).query(&[("full", "1")]);

        let body = fetch_text(request).await?;
        Ok(self.parse_response(&body))
    }
}
