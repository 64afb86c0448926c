//! Export of tables and reports
//!
//! Supports:
//! - Table CSV export (the month-annotated sheet)
//! - Pretty JSON export of any report struct

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Table;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidRequest(format!(
                "unknown export format '{}' (expected csv or json)",
                other
            ))),
        }
    }
}

/// Write `table` as CSV with its header row; blank cells are written empty
pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    wtr.write_record(&table.headers)?;
    for record in &table.records {
        wtr.write_record(record.values.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `table` as a JSON array of objects keyed by header
pub fn write_table_json<W: Write>(writer: W, table: &Table) -> Result<()> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = table
        .records
        .iter()
        .map(|record| {
            table
                .headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = serde_json::to_value(record.get(i))?;
                    Ok((header.clone(), value))
                })
                .collect::<Result<_>>()
        })
        .collect::<Result<_>>()?;
    write_json(writer, &rows)
}

/// Pretty-print any serializable report as JSON
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::read_table;
    use crate::models::{Record, Value};

    fn sample() -> Table {
        Table::with_records(
            vec!["id".into(), "period".into(), "month_number".into()],
            vec![
                Record::new(vec![Value::Number(1.0), Value::text("2024-03"), Value::Number(3.0)]),
                Record::new(vec![Value::Number(2.0), Value::text("n/a"), Value::Null]),
            ],
        )
    }

    #[test]
    fn test_write_table_csv() {
        let mut out = Vec::new();
        write_table(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "id,period,month_number\n1,2024-03,3\n2,n/a,\n");

        // Written output reads back to the same shape
        let back = read_table(text.as_bytes()).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back.records[1].get(2).is_null());
    }

    #[test]
    fn test_write_table_json() {
        let mut out = Vec::new();
        write_table_json(&mut out, &sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["period"], "2024-03");
        assert_eq!(parsed[0]["month_number"], 3.0);
        assert!(parsed[1]["month_number"].is_null());
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap().as_str(), "json");
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
