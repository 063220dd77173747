// 公开导出的模块，供外部使用
pub mod config;
pub mod encoder;
pub mod errors;
pub mod extractors;
pub mod models;
pub mod normalize;
pub mod services;

// 为了支持主程序，暂时保持这些模块公开
// 但在库使用场景中，这些应该是内部模块
#[doc(hidden)]
pub mod cache;
#[doc(hidden)]
pub mod fetch;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use config::SnapshotOptions;
pub use errors::{DsnapError, Result};
pub use models::record::{Exchange, ExtractionResult, ExtractionStats, StockRecord};
pub use services::snapshot_service::{CsvAttachment, Snapshot, SnapshotService};
