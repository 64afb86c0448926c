//! Month Partitioner
//!
//! Splits a table into per-month subsets using the period column. Each
//! period value goes through an ordered list of [`MonthStrategy`]s; the first
//! one that yields a month wins. Records no strategy can read are dropped
//! and counted.
//!
//! Comparisons always need two months, so degenerate results are reshaped:
//! - no month found: the whole table becomes month 1, then is split as below
//! - one month found: its records are split by order into halves keyed 1 and 2

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::Datelike;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::columns::require_width;
use crate::dates;
use crate::error::{Error, Result};
use crate::models::{MonthBucket, MonthKey, Record, Synthesis, Table, Value};

/// Header of the column added by [`annotate_months`]
pub const MONTH_COLUMN: &str = "month_number";

/// Tables narrower than this are never partitioned
const MIN_PARTITION_WIDTH: usize = 2;

/// One way of reading a month out of a period value
pub trait MonthStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// The calendar month, or None if this strategy does not apply
    fn extract(&self, value: &Value) -> Option<u32>;
}

/// The cell already holds a date or datetime
pub struct DateValueStrategy;

impl MonthStrategy for DateValueStrategy {
    fn name(&self) -> &'static str {
        "date_value"
    }

    fn extract(&self, value: &Value) -> Option<u32> {
        match value {
            Value::Date(d) => Some(d.month()),
            Value::DateTime(dt) => Some(dt.month()),
            _ => None,
        }
    }
}

/// The cell is text that parses as a date, datetime or year-month
pub struct ParsedDateStrategy;

impl MonthStrategy for ParsedDateStrategy {
    fn name(&self) -> &'static str {
        "parsed_date"
    }

    fn extract(&self, value: &Value) -> Option<u32> {
        let Value::Text(s) = value else {
            return None;
        };
        dates::parse_date(s)
            .or_else(|| dates::parse_datetime(s).map(|dt| dt.date()))
            .or_else(|| dates::parse_year_month(s))
            .map(|d| d.month())
    }
}

/// A numeral followed by the month marker, e.g. `113年2月` -> 2
pub struct MonthMarkerStrategy;

fn month_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)月").expect("month marker pattern is valid"))
}

impl MonthStrategy for MonthMarkerStrategy {
    fn name(&self) -> &'static str {
        "month_marker"
    }

    fn extract(&self, value: &Value) -> Option<u32> {
        if value.is_null() {
            return None;
        }
        let text = value.to_string();
        let caps = month_marker().captures(&text)?;
        caps.get(1)?.as_str().parse().ok()
    }
}

/// Ordered list of month strategies
pub struct MonthExtractor {
    strategies: Vec<Box<dyn MonthStrategy>>,
}

impl Default for MonthExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MonthExtractor {
    /// Built-in strategies: date value, parsed date, month marker
    pub fn new() -> Self {
        let mut extractor = Self {
            strategies: Vec::new(),
        };
        extractor.register(Box::new(DateValueStrategy));
        extractor.register(Box::new(ParsedDateStrategy));
        extractor.register(Box::new(MonthMarkerStrategy));
        extractor
    }

    /// Append a strategy; it is tried after the existing ones
    pub fn register(&mut self, strategy: Box<dyn MonthStrategy>) {
        self.strategies.push(strategy);
    }

    /// Month of one period value
    pub fn extract(&self, value: &Value) -> Result<MonthKey> {
        for strategy in &self.strategies {
            if let Some(month) = strategy.extract(value) {
                if (1..=12).contains(&month) {
                    return Ok(month);
                }
                debug!(
                    strategy = strategy.name(),
                    month, "Ignoring out-of-range month"
                );
            }
        }
        Err(Error::Parse(format!(
            "no month in period value '{}'",
            value
        )))
    }
}

/// Result of partitioning a table by month
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Partition {
    pub buckets: MonthBucket,
    /// Records whose period value held no month
    pub dropped: usize,
    /// Set when the buckets are not real calendar months
    pub synthesis: Option<Synthesis>,
}

impl Partition {
    /// The whole table as month 1, used when the table cannot be partitioned
    pub fn whole_table(table: &Table) -> Self {
        let mut buckets = MonthBucket::new();
        buckets.insert(1, table.clone());
        Self {
            buckets,
            dropped: 0,
            synthesis: Some(Synthesis::SchemaFallback),
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesis.is_some()
    }
}

/// Partition `table` by the month in column `period_index`
pub fn partition(table: &Table, period_index: usize) -> Result<Partition> {
    partition_with(&MonthExtractor::new(), table, period_index)
}

/// Partition with a custom strategy list
pub fn partition_with(
    extractor: &MonthExtractor,
    table: &Table,
    period_index: usize,
) -> Result<Partition> {
    require_width(
        table,
        "partition",
        MIN_PARTITION_WIDTH.max(period_index + 1),
    )?;

    if table.is_empty() {
        warn!("Table has no records; no months to partition");
        return Ok(Partition::default());
    }

    let mut grouped: BTreeMap<MonthKey, Vec<&Record>> = BTreeMap::new();
    let mut dropped = 0;

    for (row, record) in table.records.iter().enumerate() {
        match extractor.extract(record.get(period_index)) {
            Ok(month) => grouped.entry(month).or_default().push(record),
            Err(e) => {
                debug!(row, error = %e, "Dropping record");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(
            dropped,
            total = table.len(),
            "Records without a readable month were left out"
        );
    }

    let mut buckets = MonthBucket::new();
    for (month, records) in grouped {
        buckets.insert(month, table.subset(records));
    }

    let (buckets, synthesis) = match buckets.len() {
        0 => {
            warn!("No month detected; splitting the whole table into two halves");
            (split_halves(table), Some(Synthesis::NoMonthsDetected))
        }
        1 => {
            let (month, only) = buckets
                .months
                .into_iter()
                .next()
                .expect("bucket has exactly one month");
            warn!(month, "Only one month detected; splitting it into two halves");
            (
                split_halves(&only),
                Some(Synthesis::SingleMonthSplit { month }),
            )
        }
        _ => (buckets, None),
    };

    info!(
        months = ?buckets.keys(),
        records = buckets.record_count(),
        dropped,
        "Partitioned table by month"
    );

    Ok(Partition {
        buckets,
        dropped,
        synthesis,
    })
}

/// First ⌊n/2⌋ records as month 1, the rest as month 2
fn split_halves(table: &Table) -> MonthBucket {
    let mid = table.len() / 2;
    let mut buckets = MonthBucket::new();
    buckets.insert(1, table.subset(&table.records[..mid]));
    buckets.insert(2, table.subset(&table.records[mid..]));
    buckets
}

/// Copy of `table` with an extra month column; unreadable periods are blank
pub fn annotate_months(table: &Table, period_index: usize) -> Result<Table> {
    require_width(
        table,
        "annotate months",
        MIN_PARTITION_WIDTH.max(period_index + 1),
    )?;

    let extractor = MonthExtractor::new();
    let mut headers = table.headers.clone();
    headers.push(MONTH_COLUMN.to_string());

    let records = table
        .records
        .iter()
        .map(|record| {
            // Pad short rows so the month lands under its header; cells past
            // the header on long rows are kept after it
            let mut values = record.values.clone();
            if values.len() < table.width() {
                values.resize(table.width(), Value::Null);
            }
            let month = match extractor.extract(record.get(period_index)) {
                Ok(month) => Value::Number(month as f64),
                Err(_) => Value::Null,
            };
            values.insert(table.width(), month);
            Record::new(values)
        })
        .collect();

    Ok(Table::with_records(headers, records))
}
