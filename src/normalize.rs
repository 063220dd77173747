//! Shared record rules applied after source-specific parsing: activity
//! filtering, run statistics and the single-timestamp date/time split.

use crate::models::record::{ExtractionStats, StockRecord};
use chrono::NaiveDateTime;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Splits the run-level update time into the date and time column values
/// shared by every record of the run.
pub fn split_as_of(as_of: NaiveDateTime) -> (String, String) {
    (
        as_of.format(DATE_FORMAT).to_string(),
        as_of.format(TIME_FORMAT).to_string(),
    )
}

/// Folds parsed rows into kept records plus run statistics.
///
/// Every parsed row counts toward `total` and every indicator of "0" counts
/// toward `inactive`, whether or not the row is kept. Inactive rows are
/// dropped only when `filter_inactive` is set. Source order is preserved.
pub fn collect_records<I>(rows: I, filter_inactive: bool) -> (Vec<StockRecord>, ExtractionStats)
where
    I: IntoIterator<Item = StockRecord>,
{
    let mut records = Vec::new();
    let mut stats = ExtractionStats::default();

    for record in rows {
        stats.total += 1;
        if record.is_inactive() {
            stats.inactive += 1;
            if filter_inactive {
                continue;
            }
        }
        records.push(record);
    }

    (records, stats)
}
