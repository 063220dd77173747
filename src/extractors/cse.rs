use crate::config::ExtractOptions;
use crate::errors::{DsnapError, Result};
use crate::extractors::base::SnapshotExtractor;
use crate::extractors::{pattern, selector};
use crate::fetch::PageFetcher;
use crate::models::record::{Exchange, ExtractionResult, StockRecord};
use crate::normalize;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info};
use regex::Regex;
use scraper::{Html, Selector};

/// CSE top trade page: two preformatted blocks, update time then rows
const CSE_LATEST_URL: &str = "http://www.csebd.com/trade/top.htm";

/// Update line of the first block, e.g. "Date: Feb 15 2010 2:30PM"
const CSE_DATE_PATTERN: &str =
    r"Date: ([a-zA-Z]{3})\s*(\d{1,2})\s*(\d{4})\s*(\d{1,2}):(\d{1,2})(AM|PM)";
/// Format of the date captures once zero-padded and joined with spaces
const CSE_DATE_FORMAT: &str = "%b %d %Y %I %M %p";

/// CSE data columns in page order. Each entry pairs the column label with
/// the fragment capturing its value, so the row pattern and the CSV header
/// both derive from this table and a column change is a one-place edit.
const ROW_SCHEMA: &[(&str, &str)] = &[
    ("Company", r"\w+"),
    ("Open", r"\d+\.?\d*"),
    ("High", r"\d+\.?\d*"),
    ("Low", r"\d+\.?\d*"),
    ("Close", r"\d+\.?\d*"),
    ("Prev. Close", r"\d+\.?\d*"),
    ("Difference", r"-?\d+\.?\d*"),
    ("Trades", r"\d+\.?\d*"),
    ("Volume", r"\d+\.?\d*"),
];

/// 吉大港证券交易所 (Chittagong Stock Exchange) extractor. The source is
/// fixed-width text inside two pre blocks rather than a table.
pub struct CseExtractor {
    date_re: Regex,
    row_re: Regex,
    pre_sel: Selector,
}

impl CseExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            date_re: pattern(CSE_DATE_PATTERN)?,
            row_re: pattern(&row_pattern())?,
            pre_sel: selector("pre")?,
        })
    }

    /// Parses the authoritative update time out of the first block.
    /// Single-digit day, hour and minute captures are zero-padded before
    /// the 12-hour-clock parse. There is no fallback: the page publishes
    /// no other update time, and failing beats stamping rows with a wrong
    /// date.
    pub fn resolve_timestamp(&self, block: &str) -> Result<NaiveDateTime> {
        let captures = self.date_re.captures(block).ok_or_else(|| {
            DsnapError::TimestampError("CSE page carries no Date line".to_string())
        })?;

        let mut parts: Vec<String> = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();
        for index in [1, 3, 4] {
            if parts[index].len() == 1 {
                parts[index] = format!("0{}", parts[index]);
            }
        }

        let composed = parts.join(" ");
        NaiveDateTime::parse_from_str(&composed, CSE_DATE_FORMAT)
            .map_err(|e| DsnapError::TimestampError(format!("CSE date {:?}: {}", composed, e)))
    }

    /// Extracts one snapshot from the top trade page.
    pub fn extract(&self, page_html: &str, options: ExtractOptions) -> Result<ExtractionResult> {
        let document = Html::parse_document(page_html);
        let blocks: Vec<String> = document
            .select(&self.pre_sel)
            .map(|pre| pre.text().collect::<String>())
            .collect();
        if blocks.len() < 2 {
            return Err(DsnapError::StructureError(format!(
                "CSE page has {} preformatted block(s), expected 2",
                blocks.len()
            )));
        }

        let as_of = self.resolve_timestamp(&blocks[0])?;

        let parsed = blocks[1].lines().filter_map(|line| self.parse_row(line));
        let (records, stats) = normalize::collect_records(parsed, options.filter_inactive);

        let header = if options.emit_header {
            Some(csv_header())
        } else {
            None
        };

        Ok(ExtractionResult {
            exchange: Exchange::Cse,
            as_of,
            header,
            records,
            stats,
        })
    }

    /// One data line into a record. Ruler, separator and footer lines do
    /// not match the row pattern and yield None, which skips them without
    /// disturbing the rest of the block.
    fn parse_row(&self, line: &str) -> Option<StockRecord> {
        let captures = self.row_re.captures(line)?;
        let company_id = captures.get(1)?.as_str().to_string();
        let fields = (2..=ROW_SCHEMA.len())
            .map(|index| {
                captures
                    .get(index)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect();
        Some(StockRecord { company_id, fields })
    }
}

#[async_trait]
impl SnapshotExtractor for CseExtractor {
    fn exchange(&self) -> Exchange {
        Exchange::Cse
    }

    async fn capture(
        &self,
        fetcher: &dyn PageFetcher,
        options: ExtractOptions,
    ) -> Result<ExtractionResult> {
        info!("Downloading transaction data from CSE");
        let page = fetcher.fetch(CSE_LATEST_URL).await?;
        if page.is_empty() {
            return Err(DsnapError::FetchEmptyError(CSE_LATEST_URL.to_string()));
        }
        debug!("Download completed, parsing data");
        let result = self.extract(&page, options)?;
        info!("CSE last updated on {}", result.as_of);
        Ok(result)
    }
}

/// Builds the row pattern from the schema: the company code opens the line,
/// the full company name is skipped lazily, then the numeric columns follow
/// separated by runs of spaces. No trailing anchor, so a line may end right
/// after the volume.
fn row_pattern() -> String {
    let mut built = String::from(r"^\s*");
    for (index, (_, fragment)) in ROW_SCHEMA.iter().enumerate() {
        match index {
            0 => {
                built.push('(');
                built.push_str(fragment);
                built.push_str(r").*?");
            }
            1 => {
                built.push('(');
                built.push_str(fragment);
                built.push(')');
            }
            _ => {
                built.push_str(r"\s+(");
                built.push_str(fragment);
                built.push(')');
            }
        }
    }
    built
}

/// Column labels with Date and Time spliced in after the company
fn csv_header() -> Vec<String> {
    let mut header: Vec<String> = ROW_SCHEMA
        .iter()
        .map(|(label, _)| label.to_string())
        .collect();
    header.insert(1, "Date".to_string());
    header.insert(2, "Time".to_string());
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PAGE: &str = r#"<html><body>
<pre>
        Chittagong Stock Exchange
        Date: Feb 15 2010 2:30PM
</pre>
<pre>
Company       Name                 Open    High     Low   Close  Prev.Cl   Diff  Trades    Volume
-------       ----                 ----    ----     ---   -----  -------   ----  ------    ------
XYZ           Xyz Industries       12.0    12.5    11.8    12.3     12.1    0.2     150     20000
ABC           Abc Holdings Ltd.    10.0    11.0     9.0    10.5     10.3   -0.2       0         0
</pre>
</body></html>"#;

    fn extractor() -> CseExtractor {
        CseExtractor::new().unwrap()
    }

    fn options(emit_header: bool, filter_inactive: bool) -> ExtractOptions {
        ExtractOptions {
            emit_header,
            filter_inactive,
        }
    }

    #[test]
    fn single_digit_date_parts_are_zero_padded() {
        let as_of = extractor()
            .resolve_timestamp("Date: Jan 5 2010 9:30AM")
            .unwrap();
        assert_eq!(
            as_of,
            NaiveDate::from_ymd_opt(2010, 1, 5)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn afternoon_times_use_the_twelve_hour_clock() {
        let as_of = extractor()
            .resolve_timestamp("Date: Feb 15 2010 2:30PM")
            .unwrap();
        assert_eq!(
            as_of,
            NaiveDate::from_ymd_opt(2010, 2, 15)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn missing_date_line_is_a_timestamp_error() {
        let err = extractor().resolve_timestamp("no date here").unwrap_err();
        assert!(matches!(err, DsnapError::TimestampError(_)));
    }

    #[test]
    fn data_lines_parse_into_code_and_numeric_fields() {
        let line = "XYZ 12.0 12.5 11.8 12.3 12.1 0.2 150 20000";
        let record = extractor().parse_row(line).unwrap();
        assert_eq!(record.company_id, "XYZ");
        assert_eq!(
            record.fields,
            vec!["12.0", "12.5", "11.8", "12.3", "12.1", "0.2", "150", "20000"]
        );
    }

    #[test]
    fn the_full_name_column_is_skipped() {
        let line = "GRAMEEN   Grameenphone Ltd.   10.0 11.0 9.0 10.5 10.3 0.2 5 100";
        let record = extractor().parse_row(line).unwrap();
        assert_eq!(record.company_id, "GRAMEEN");
        assert_eq!(record.fields[0], "10.0");
        assert_eq!(record.fields[7], "100");
    }

    #[test]
    fn negative_differences_are_captured() {
        let line = "ABC 10.0 11.0 9.0 10.5 10.3 -0.2 7 1000";
        let record = extractor().parse_row(line).unwrap();
        assert_eq!(record.fields[5], "-0.2");
    }

    #[test]
    fn ruler_lines_are_skipped() {
        assert!(extractor().parse_row("------- ---- ---- ----").is_none());
        assert!(extractor().parse_row("--- separator ---").is_none());
        assert!(extractor().parse_row("").is_none());
        assert!(extractor().parse_row("Issues Traded: 197").is_none());
    }

    #[test]
    fn extraction_reads_timestamp_and_rows_from_the_blocks() {
        let result = extractor().extract(PAGE, options(false, false)).unwrap();

        assert_eq!(result.exchange, Exchange::Cse);
        assert_eq!(
            result.as_of,
            NaiveDate::from_ymd_opt(2010, 2, 15)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.inactive, 1);
        let ids: Vec<&str> = result
            .records
            .iter()
            .map(|r| r.company_id.as_str())
            .collect();
        assert_eq!(ids, vec!["XYZ", "ABC"]);
    }

    #[test]
    fn filtering_drops_companies_without_trades() {
        let result = extractor().extract(PAGE, options(false, true)).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].company_id, "XYZ");
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.inactive, 1);
    }

    #[test]
    fn header_lists_the_schema_with_date_and_time() {
        let result = extractor().extract(PAGE, options(true, true)).unwrap();
        assert_eq!(
            result.header.unwrap(),
            vec![
                "Company",
                "Date",
                "Time",
                "Open",
                "High",
                "Low",
                "Close",
                "Prev. Close",
                "Difference",
                "Trades",
                "Volume"
            ]
        );
    }

    #[test]
    fn a_single_block_page_is_a_structure_error() {
        let err = extractor()
            .extract("<html><body><pre>only one</pre></body></html>", options(false, true))
            .unwrap_err();
        assert!(matches!(err, DsnapError::StructureError(_)));
    }

    #[test]
    fn a_block_missing_the_date_is_a_timestamp_error() {
        let page = "<html><body><pre>no date</pre><pre>rows</pre></body></html>";
        let err = extractor().extract(page, options(false, true)).unwrap_err();
        assert!(matches!(err, DsnapError::TimestampError(_)));
    }
}
