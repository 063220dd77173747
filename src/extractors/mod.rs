pub mod base;
pub mod cse;
pub mod dse;

use crate::errors::{DsnapError, Result};
use regex::Regex;
use scraper::Selector;

/// Compiles a CSS selector, mapping the failure into a crate error
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| DsnapError::PatternError(format!("selector {}: {}", css, e)))
}

/// Compiles a regular expression, mapping the failure into a crate error
pub(crate) fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| DsnapError::PatternError(e.to_string()))
}
