//! CSV import of the call-record sheet
//!
//! The spreadsheet is exported to CSV by the front end. Cells are typed on
//! the way in so the partitioner can use date values directly.

use std::fs;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dates;
use crate::error::{Error, Result};
use crate::models::{Record, Table, Value};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Where a loaded table came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    /// SHA-256 of the file content
    pub content_hash: String,
}

/// Infer the type of a single CSV cell
pub fn infer_value(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Some(dt) = dates::parse_datetime(s) {
        return Value::DateTime(dt);
    }
    if let Some(date) = dates::parse_date(s) {
        return Value::Date(date);
    }
    if looks_numeric(s) {
        if let Ok(n) = s.parse::<f64>() {
            return Value::Number(n);
        }
    }
    Value::Text(s.to_string())
}

/// Reject words like "nan" or "inf" that f64 parsing would accept
fn looks_numeric(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && s.chars().any(|c| c.is_ascii_digit())
}

/// Read a headered CSV into a table
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(Error::EmptyInput("CSV has no header row".into()));
    }

    let mut table = Table::new(headers);
    for result in rdr.records() {
        let record = result?;
        let values = record.iter().map(infer_value).collect();
        table.push(Record::new(values));
    }

    debug!(
        "Parsed {} records with {} columns",
        table.len(),
        table.width()
    );
    Ok(table)
}

/// Read a CSV file and fingerprint its content
pub fn read_table_file(path: &Path) -> Result<(Table, SourceInfo)> {
    let bytes = fs::read(path)?;
    let content_hash = hex::encode(Sha256::digest(&bytes));
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());
    let table = read_table(body)?;

    let info = SourceInfo {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        rows: table.len(),
        columns: table.width(),
        content_hash,
    };
    Ok((table, info))
}
