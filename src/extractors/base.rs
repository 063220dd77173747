use crate::config::ExtractOptions;
use crate::errors::Result;
use crate::fetch::PageFetcher;
use crate::models::record::{Exchange, ExtractionResult};
use async_trait::async_trait;

/// Base trait for exchange snapshot extractors
#[async_trait]
pub trait SnapshotExtractor: Send + Sync {
    /// Get the exchange this extractor captures
    fn exchange(&self) -> Exchange;

    /// Capture one snapshot: fetch the pages this exchange publishes
    /// through `fetcher` and extract them into a result.
    /// Page parsing itself is synchronous and holds no state across runs.
    async fn capture(
        &self,
        fetcher: &dyn PageFetcher,
        options: ExtractOptions,
    ) -> Result<ExtractionResult>;
}
