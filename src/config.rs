use crate::models::record::Exchange;
use std::path::PathBuf;
use std::time::Duration;

/// Options for one snapshot run. Defaults match the classic command line:
/// verbose, inactive companies pruned, no header, no screen dump.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub exchange: Exchange,
    /// Prepend a column-label line to the CSV output
    pub emit_header: bool,
    /// Explicit output file; overrides the timestamp-derived name
    pub output_path: Option<PathBuf>,
    /// Directory for timestamp-named output files
    pub output_dir: PathBuf,
    pub verbose: bool,
    /// Drop companies whose activity indicator is "0"
    pub filter_inactive: bool,
    /// Also print the captured rows on stdout
    pub dump_to_screen: bool,
    /// Freshness window for served-mode caching
    pub cache_ttl: Duration,
}

impl SnapshotOptions {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            emit_header: false,
            output_path: None,
            output_dir: PathBuf::from("csv"),
            verbose: true,
            filter_inactive: true,
            dump_to_screen: false,
            cache_ttl: Duration::from_secs(60),
        }
    }

    pub fn with_emit_header(mut self, emit_header: bool) -> Self {
        self.emit_header = emit_header;
        self
    }

    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.output_dir = PathBuf::from(dir);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_filter_inactive(mut self, filter_inactive: bool) -> Self {
        self.filter_inactive = filter_inactive;
        self
    }

    pub fn with_dump_to_screen(mut self, dump_to_screen: bool) -> Self {
        self.dump_to_screen = dump_to_screen;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Extraction-facing subset handed to the extractors; the rest of the
    /// options stay with the orchestrator.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            emit_header: self.emit_header,
            filter_inactive: self.filter_inactive,
        }
    }
}

/// The two options page extraction itself depends on
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub emit_header: bool,
    pub filter_inactive: bool,
}
