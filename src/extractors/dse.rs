use crate::config::ExtractOptions;
use crate::errors::{DsnapError, Result};
use crate::extractors::base::SnapshotExtractor;
use crate::extractors::{pattern, selector};
use crate::fetch::PageFetcher;
use crate::models::record::{Exchange, ExtractionResult, StockRecord};
use crate::normalize;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// DSE index page carrying the last-update line
const DSE_ROOT_URL: &str = "http://www.dsebd.org/";
/// DSE latest share price page, the data table itself
const DSE_LATEST_URL: &str = "http://www.dsebd.org/latest_share_price_all.php";

/// Last-update line on the index page, e.g. "Feb 15, 2010 at 14:30:05"
const DSE_DATE_PATTERN: &str = r"[a-zA-Z]{3}\s*\d{2},\s*\d{4}\s*at\s*\d{2}:\d{2}:\d{2}";
/// Format of the date pattern once all whitespace is stripped
const DSE_DATE_FORMAT: &str = "%b%d,%Yat%H:%M:%S";

/// 达卡证券交易所 (Dhaka Stock Exchange) extractor. The source is a
/// table-soup HTML page where every value hides inside old-school markup.
pub struct DseExtractor {
    body_re: Regex,
    date_re: Regex,
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    bold_sel: Selector,
    link_sel: Selector,
}

impl DseExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // The page opens <body> with attributes the tree builder trips on
            body_re: pattern(r"<body[^>]*>")?,
            date_re: pattern(DSE_DATE_PATTERN)?,
            table_sel: selector("table")?,
            row_sel: selector("tr")?,
            cell_sel: selector("td")?,
            bold_sel: selector("b")?,
            link_sel: selector("a")?,
        })
    }

    /// Reads the last-update time off the index page. The line comes and
    /// goes with site maintenance, so a missing or garbled date falls back
    /// to the current exchange clock instead of failing the run.
    pub fn resolve_timestamp(&self, index_html: &str) -> NaiveDateTime {
        if let Some(found) = self.date_re.find(index_html) {
            let compact: String = found
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            match NaiveDateTime::parse_from_str(&compact, DSE_DATE_FORMAT) {
                Ok(as_of) => return as_of,
                Err(e) => warn!("DSE index date {:?} did not parse: {}", compact, e),
            }
        } else {
            warn!("DSE index page carried no last-update line, using current time");
        }
        util::exchange_now()
    }

    /// Extracts one snapshot from the latest share price page.
    pub fn extract(
        &self,
        page_html: &str,
        as_of: NaiveDateTime,
        options: ExtractOptions,
    ) -> Result<ExtractionResult> {
        let sanitized = self.body_re.replace_all(page_html, "<body>");
        let document = Html::parse_document(&sanitized);

        let table = document
            .select(&self.table_sel)
            .next()
            .ok_or_else(|| DsnapError::StructureError("DSE page has no data table".to_string()))?;

        let mut rows = table.select(&self.row_sel);
        let header_row = rows.next().ok_or_else(|| {
            DsnapError::StructureError("DSE data table has no header row".to_string())
        })?;

        let labels: Vec<String> = header_row
            .select(&self.bold_sel)
            .map(clean_label)
            .collect();
        if labels.is_empty() {
            return Err(DsnapError::StructureError(
                "DSE header row carries no bold labels".to_string(),
            ));
        }

        let header = if options.emit_header {
            let mut header = labels;
            header.insert(1, "Date".to_string());
            header.insert(2, "Time".to_string());
            Some(header)
        } else {
            None
        };

        let mut parsed = Vec::new();
        for (index, row) in rows.enumerate() {
            // Cell layout: running row number, linked company code, values
            let mut cells = row.select(&self.cell_sel);
            let company_cell = cells.nth(1).ok_or_else(|| {
                DsnapError::StructureError(format!(
                    "DSE data row {} has no company cell",
                    index + 1
                ))
            })?;
            let company_id = company_cell
                .select(&self.link_sel)
                .next()
                .map(first_text)
                .ok_or_else(|| {
                    DsnapError::StructureError(format!(
                        "DSE data row {} has no company link",
                        index + 1
                    ))
                })?;
            if company_id.is_empty() {
                return Err(DsnapError::StructureError(format!(
                    "DSE data row {} has an empty company code",
                    index + 1
                )));
            }
            let fields: Vec<String> = cells.map(first_text).collect();
            parsed.push(StockRecord { company_id, fields });
        }

        let (records, stats) = normalize::collect_records(parsed, options.filter_inactive);

        Ok(ExtractionResult {
            exchange: Exchange::Dse,
            as_of,
            header,
            records,
            stats,
        })
    }
}

#[async_trait]
impl SnapshotExtractor for DseExtractor {
    fn exchange(&self) -> Exchange {
        Exchange::Dse
    }

    async fn capture(
        &self,
        fetcher: &dyn PageFetcher,
        options: ExtractOptions,
    ) -> Result<ExtractionResult> {
        info!("Retrieving the last update time from the DSE index page");
        let index_page = fetcher.fetch(DSE_ROOT_URL).await?;
        let as_of = self.resolve_timestamp(&index_page);
        info!("DSE last updated on {}", as_of);

        info!("Downloading transaction data from DSE");
        let page = fetcher.fetch(DSE_LATEST_URL).await?;
        if page.is_empty() {
            return Err(DsnapError::FetchEmptyError(DSE_LATEST_URL.to_string()));
        }
        debug!("Download completed, parsing data");
        self.extract(&page, as_of, options)
    }
}

/// Header cells pad their labels with non-breaking spaces
fn clean_label(cell: ElementRef) -> String {
    let text: String = cell.text().collect();
    text.replace("&nbsp;", "")
        .replace('\u{a0}', "")
        .trim()
        .to_string()
}

/// First non-blank text node of a cell, trimmed. Values on this page sit
/// inside font and anchor wrappers, so the raw cell text starts with
/// layout whitespace.
fn first_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or("")
        .to_string()
}
