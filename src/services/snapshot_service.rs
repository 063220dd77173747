use crate::cache::{self, SnapshotCache};
use crate::config::SnapshotOptions;
use crate::encoder;
use crate::errors::Result;
use crate::extractors::base::SnapshotExtractor;
use crate::extractors::cse::CseExtractor;
use crate::extractors::dse::DseExtractor;
use crate::fetch::PageFetcher;
use crate::models::record::{Exchange, ExtractionResult};
use crate::normalize;
use crate::util;
use chrono::NaiveDateTime;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// One snapshot run: the extraction result plus its encoded CSV bytes
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub result: ExtractionResult,
    pub csv: Vec<u8>,
}

/// CSV payload prepared for an HTTP front end
#[derive(Debug, Clone)]
pub struct CsvAttachment {
    /// Timestamp-derived download name
    pub filename: String,
    pub content_type: &'static str,
    /// Update time rendered as an HTTP date
    pub last_modified: String,
    pub body: Vec<u8>,
}

impl CsvAttachment {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// 快照服务，runs the capture pipeline once per call and hands the encoded
/// bytes to the file or HTTP output side. Holds no page state across runs.
pub struct SnapshotService {
    options: SnapshotOptions,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Box<dyn SnapshotExtractor>,
}

impl SnapshotService {
    /// Creates the service for the exchange selected in the options
    pub fn new(options: SnapshotOptions, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let extractor: Box<dyn SnapshotExtractor> = match options.exchange {
            Exchange::Dse => Box::new(DseExtractor::new()?),
            Exchange::Cse => Box::new(CseExtractor::new()?),
        };
        Ok(Self {
            options,
            fetcher,
            extractor,
        })
    }

    /// Runs the pipeline once and encodes the captured snapshot
    pub async fn run(&self) -> Result<Snapshot> {
        let result = self
            .extractor
            .capture(self.fetcher.as_ref(), self.options.extract_options())
            .await?;

        info!("Completed analysis of {}", result.exchange);
        info!(
            "Quick stats: total {}, active {}, inactive {}",
            result.stats.total,
            result.stats.active(),
            result.stats.inactive
        );

        let csv = encoder::encode(&result)?;
        Ok(Snapshot { result, csv })
    }

    /// File mode: runs the pipeline and persists the CSV bytes. Returns the
    /// path written, either the explicit output path or a timestamp-derived
    /// name inside the output directory.
    pub async fn write_csv(&self) -> Result<PathBuf> {
        let snapshot = self.run().await?;

        let path = self.destination(&snapshot.result);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, &snapshot.csv)?;
        info!("CSV data written to {}", path.display());

        if self.options.dump_to_screen {
            dump_records(&snapshot.result);
        }

        Ok(path)
    }

    /// Served mode: answers from the cache while the last run is fresh,
    /// otherwise runs the pipeline and refills both cache slots.
    pub async fn serve(&self, cache: &dyn SnapshotCache) -> Result<CsvAttachment> {
        let exchange = self.options.exchange;
        let csv_key = cache::csv_key(exchange);
        let as_of_key = cache::as_of_key(exchange);

        if let (Some(csv), Some(raw_as_of)) =
            (cache.get(&csv_key).await, cache.get(&as_of_key).await)
        {
            let stored = String::from_utf8_lossy(&raw_as_of);
            if let Ok(as_of) = util::as_of_from_string(&stored) {
                info!("Serving {} snapshot from cache", exchange);
                return Ok(self.attachment(exchange, as_of, csv));
            }
        }

        let snapshot = self.run().await?;
        let as_of = snapshot.result.as_of;
        cache
            .set(&csv_key, snapshot.csv.clone(), self.options.cache_ttl)
            .await;
        cache
            .set(
                &as_of_key,
                util::as_of_to_string(as_of).into_bytes(),
                self.options.cache_ttl,
            )
            .await;

        Ok(self.attachment(exchange, as_of, snapshot.csv))
    }

    fn destination(&self, result: &ExtractionResult) -> PathBuf {
        match &self.options.output_path {
            Some(path) => path.clone(),
            None => self
                .options
                .output_dir
                .join(util::snapshot_filename(result.exchange, result.as_of)),
        }
    }

    fn attachment(&self, exchange: Exchange, as_of: NaiveDateTime, body: Vec<u8>) -> CsvAttachment {
        CsvAttachment {
            filename: util::snapshot_filename(exchange, as_of),
            content_type: "text/csv",
            last_modified: httpdate::fmt_http_date(util::as_of_to_system_time(as_of)),
            body,
        }
    }
}

/// Prints kept rows the way they land in the CSV output
fn dump_records(result: &ExtractionResult) {
    let (date, time) = normalize::split_as_of(result.as_of);
    for record in &result.records {
        let mut row = Vec::with_capacity(record.fields.len() + 3);
        row.push(record.company_id.as_str());
        row.push(date.as_str());
        row.push(time.as_str());
        for field in &record.fields {
            row.push(field.as_str());
        }
        println!("{}", row.join(","));
    }
}
