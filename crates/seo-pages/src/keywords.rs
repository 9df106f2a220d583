/// Parser for keyword lists.
///
/// Each non-empty line that does not start with `#` is one record:
/// `keyword[, city[, state[, country]]]`. Missing trailing fields are empty;
/// fields past the fourth are ignored. Duplicates are kept.
use std::path::Path;

use tracing::debug;

use crate::error::AppError;
use crate::model::{KeywordRecord, Location};

pub fn parse_keywords(input: &str) -> Vec<KeywordRecord> {
    let records: Vec<KeywordRecord> = input
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_line)
        .collect();
    debug!(records = records.len(), "parsed keyword input");
    records
}

/// Read a keyword CSV file and parse it with the same line rules.
pub fn read_keywords_file(path: impl AsRef<Path>) -> Result<Vec<KeywordRecord>, AppError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(parse_keywords(&content))
}

fn parse_line(line: &str) -> KeywordRecord {
    if !line.contains(',') {
        return KeywordRecord::new(line);
    }
    let mut fields = line.split(',').map(str::trim);
    let mut next = || fields.next().unwrap_or_default().to_string();
    let keyword = next();
    let city = next();
    let state = next();
    let country = next();
    KeywordRecord::with_location(keyword, Location::new(city, state, country))
}
