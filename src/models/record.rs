use crate::errors::DsnapError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Stock exchange whose snapshot page is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Exchange {
    /// Dhaka Stock Exchange (tabular HTML source)
    Dse,
    /// Chittagong Stock Exchange (preformatted text source)
    Cse,
}

impl Exchange {
    /// Lowercase code used in file names and cache keys
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Dse => "dse",
            Exchange::Cse => "cse",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Exchange::Dse => "DSE",
            Exchange::Cse => "CSE",
        })
    }
}

impl FromStr for Exchange {
    type Err = DsnapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dse" => Ok(Exchange::Dse),
            "cse" => Ok(Exchange::Cse),
            other => Err(DsnapError::DataError(format!(
                "Unknown exchange: {}",
                other
            ))),
        }
    }
}

/// One company row extracted from a snapshot page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    /// Short trading code identifying the company
    pub company_id: String,
    /// Remaining cell values in source column order. The last entry is the
    /// trade-count activity indicator.
    pub fields: Vec<String>,
}

impl StockRecord {
    /// A company is inactive when its activity indicator is exactly "0".
    /// The indicator stays textual; "0.0" or "00" mean an active company
    /// whose page printed an unusual count.
    pub fn is_inactive(&self) -> bool {
        self.fields.last().map(|f| f == "0").unwrap_or(false)
    }
}

/// Counters accumulated over the parsed rows of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Rows that parsed into records, kept or not
    pub total: usize,
    /// Rows whose activity indicator was "0"
    pub inactive: usize,
}

impl ExtractionStats {
    pub fn active(&self) -> usize {
        self.total - self.inactive
    }
}

/// Everything one extractor run produces
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub exchange: Exchange,
    /// Authoritative update time shared by every record of the run
    pub as_of: NaiveDateTime,
    /// Column labels, present only when header emission was requested
    pub header: Option<Vec<String>>,
    /// Kept records in source page order
    pub records: Vec<StockRecord>,
    pub stats: ExtractionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_requires_exact_zero() {
        let zero = StockRecord {
            company_id: "ABC".to_string(),
            fields: vec!["10".to_string(), "0".to_string()],
        };
        assert!(zero.is_inactive());

        let zero_zero = StockRecord {
            company_id: "ABC".to_string(),
            fields: vec!["10".to_string(), "0.0".to_string()],
        };
        assert!(!zero_zero.is_inactive());

        let padded = StockRecord {
            company_id: "ABC".to_string(),
            fields: vec!["10".to_string(), "00".to_string()],
        };
        assert!(!padded.is_inactive());

        let empty = StockRecord {
            company_id: "ABC".to_string(),
            fields: Vec::new(),
        };
        assert!(!empty.is_inactive());
    }

    #[test]
    fn exchange_codes_and_parsing() {
        assert_eq!(Exchange::Dse.code(), "dse");
        assert_eq!(Exchange::Cse.code(), "cse");
        assert_eq!("DSE".parse::<Exchange>().unwrap(), Exchange::Dse);
        assert_eq!("cse".parse::<Exchange>().unwrap(), Exchange::Cse);
        assert!("nyse".parse::<Exchange>().is_err());
    }

    #[test]
    fn stats_active_is_total_minus_inactive() {
        let stats = ExtractionStats {
            total: 7,
            inactive: 3,
        };
        assert_eq!(stats.active(), 4);
    }
}
