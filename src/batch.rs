//! Batch input handling for entity CSV files
//!
//! Reads the spreadsheet that drives a run:
//! - header-based column lookup, both column names configurable
//! - rows with a blank entity name are counted and skipped, never resolved
//! - optional row limit for sampling large files
//!
//! Location hints leave here exactly as found (possibly empty); the driver
//! substitutes the UNKNOWN sentinel at resolution time so the core never
//! sees an empty hint.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// One input row worth resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_name: String,
    /// May be empty here; empty hints get the sentinel later.
    pub location_hint: String,
}

impl EntityRecord {
    pub fn new(entity_name: impl Into<String>, location_hint: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            location_hint: location_hint.into(),
        }
    }
}

/// What the reader collected, plus what it had to drop along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInput {
    pub records: Vec<EntityRecord>,
    /// Rows dropped for having no entity name.
    pub skipped_blank: usize,
    /// True when the row limit cut the file short.
    pub truncated: bool,
}

/// Read entity rows from a CSV file.
pub fn read_entity_file(
    path: &Path,
    name_col: &str,
    location_col: &str,
    limit: usize,
) -> Result<BatchInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    parse_entity_csv(&content, name_col, location_col, limit)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))
}

/// Parse entity rows from CSV content with a header row.
///
/// Column names are matched case-insensitively against the header. `limit`
/// of 0 means no limit; the limit counts accepted rows, not raw lines. A
/// missing column is an error that names the headers actually present.
pub fn parse_entity_csv(
    content: &str,
    name_col: &str,
    location_col: &str,
    limit: usize,
) -> Result<BatchInput> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();

    let name_idx = find_column(&headers, name_col)?;
    let location_idx = find_column(&headers, location_col)?;

    let mut input = BatchInput::default();

    for result in reader.records() {
        if limit > 0 && input.records.len() >= limit {
            input.truncated = true;
            break;
        }

        let record = result.context("Failed to parse CSV record")?;

        let entity_name = record.get(name_idx).map(str::trim).unwrap_or_default();
        if entity_name.is_empty() {
            input.skipped_blank += 1;
            continue;
        }

        let location_hint = record.get(location_idx).map(str::trim).unwrap_or_default();
        input
            .records
            .push(EntityRecord::new(entity_name, location_hint));
    }

    Ok(input)
}

fn find_column(headers: &csv::StringRecord, wanted: &str) -> Result<usize> {
    match headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    {
        Some(idx) => Ok(idx),
        None => {
            let available: Vec<&str> = headers.iter().collect();
            bail!(
                "Input CSV has no '{}' column (available columns: {})",
                wanted,
                available.join(", ")
            );
        }
    }
}
