//! Deterministic CSV encoding of extraction results.

use crate::errors::{DsnapError, Result};
use crate::models::record::ExtractionResult;
use crate::normalize;

/// Encodes a result as CSV bytes: the optional header line first, then one
/// line per kept record laid out as company, date, time, remaining fields.
/// Output depends only on the result value, so equal results encode to
/// identical bytes.
pub fn encode(result: &ExtractionResult) -> Result<Vec<u8>> {
    // Rows keep whatever width the page gave them
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    if let Some(header) = &result.header {
        writer.write_record(header)?;
    }

    let (date, time) = normalize::split_as_of(result.as_of);
    for record in &result.records {
        let mut row: Vec<&str> = Vec::with_capacity(record.fields.len() + 3);
        row.push(&record.company_id);
        row.push(&date);
        row.push(&time);
        for field in &record.fields {
            row.push(field);
        }
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| DsnapError::DataError(e.to_string()))
}
