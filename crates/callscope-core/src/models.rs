//! Domain models for callscope

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates;

/// Calendar month number (1-12), or a synthetic key after degenerate splitting
pub type MonthKey = u32;

/// A single cell of a call record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Blank cell; counted as its own category
    #[default]
    Null,
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Calendar date of this value, parsing text when needed
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            Self::Text(s) => {
                dates::parse_date(s).or_else(|| dates::parse_datetime(s).map(|dt| dt.date()))
            }
            Self::Null | Self::Number(_) => None,
        }
    }

    /// Label used when rendering a category; blanks get a placeholder
    pub fn label(&self) -> String {
        if self.is_null() {
            "(blank)".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Normalise zero and NaN so equal numbers hash equally
fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Number(a), Self::Number(b)) => number_bits(*a) == number_bits(*b),
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Number(n) => number_bits(*n).hash(state),
            Self::Date(d) => d.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// One row of the call-record sheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Cell at `index`; cells past the end of a short row read as `Null`
    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of records sharing one header row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    pub fn with_records(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    /// Number of schema columns
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn header(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    /// Values of one column, in record order
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.records.iter().map(move |r| r.get(index))
    }

    /// New table with the same headers holding clones of `records`
    pub fn subset<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Table {
        Table {
            headers: self.headers.clone(),
            records: records.into_iter().cloned().collect(),
        }
    }
}

/// Per-month subsets of a table, iterated in ascending month order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthBucket {
    pub months: BTreeMap<MonthKey, Table>,
}

impl MonthBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, month: MonthKey, table: Table) {
        self.months.insert(month, table);
    }

    pub fn get(&self, month: MonthKey) -> Option<&Table> {
        self.months.get(&month)
    }

    pub fn keys(&self) -> Vec<MonthKey> {
        self.months.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonthKey, &Table)> {
        self.months.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Total records across every month
    pub fn record_count(&self) -> usize {
        self.months.values().map(Table::len).sum()
    }
}

/// Why the month buckets do not reflect real calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Synthesis {
    /// No period value produced a month; the whole table was split in two
    NoMonthsDetected,
    /// Only one month was found; its records were split in two
    SingleMonthSplit { month: MonthKey },
    /// The table is too narrow to partition; the whole table is bucket 1
    SchemaFallback,
}

impl Synthesis {
    /// Notice shown to the analyst
    pub fn describe(&self) -> String {
        match self {
            Self::NoMonthsDetected => {
                "No month could be detected; all records were split into two halves (1, 2)"
                    .to_string()
            }
            Self::SingleMonthSplit { month } => format!(
                "Only month {} was found; its records were split into two halves (1, 2)",
                month
            ),
            Self::SchemaFallback => {
                "Too few columns to detect months; all records are treated as month 1".to_string()
            }
        }
    }
}

// ========== Statistics Models ==========

/// Occurrence counts of each distinct value in one column, first-seen order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryStat {
    pub counts: Vec<(Value, usize)>,
}

impl CategoryStat {
    pub fn get(&self, category: &Value) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Counts sorted descending; ties keep first-seen order
    pub fn ranked(&self) -> Vec<(Value, usize)> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Relative change of a category count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaRatio {
    /// (after - before) / before * 100; 0 when both counts are 0
    Percent(f64),
    /// before == 0 and after > 0
    Unbounded,
}

impl DeltaRatio {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Percent(p) => Some(*p),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl std::fmt::Display for DeltaRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{:.1}%", p),
            Self::Unbounded => write!(f, "N/A"),
        }
    }
}

/// Change of one category between two months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub category: Value,
    pub count_before: usize,
    pub count_after: usize,
    pub delta: i64,
    pub delta_ratio: DeltaRatio,
}

/// Dense per-day counts for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub category: Value,
    pub counts: Vec<usize>,
}

/// Daily trend of selected categories over the combined date range
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries {
    /// Every date from the earliest to the latest event date, inclusive
    pub dates: Vec<NaiveDate>,
    pub series: Vec<CategorySeries>,
    /// Rows whose event date could not be read
    pub skipped_dates: usize,
}

impl DailySeries {
    pub fn start(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Week-over-week comparison point for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    /// Monday that starts the week
    pub week_start: NaiveDate,
    pub count_before: usize,
    pub count_after: usize,
    pub percent: f64,
    /// `percent` is the fixed sentinel, not a computed ratio
    pub unbounded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeekly {
    pub category: Value,
    pub points: Vec<WeeklyPoint>,
}

/// Weekly percentage change of selected categories
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklySeries {
    /// Mondays covering the combined date range
    pub weeks: Vec<NaiveDate>,
    pub series: Vec<CategoryWeekly>,
    pub skipped_dates: usize,
}

// ========== Report Models ==========

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Number of calls on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// A category with its count and share of all rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Value,
    pub count: usize,
    pub percentage: f64,
}

/// Module x category counts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossTab {
    pub rows: Vec<Value>,
    pub columns: Vec<Value>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, row: &Value, column: &Value) -> usize {
        let r = self.rows.iter().position(|v| v == row);
        let c = self.columns.iter().position(|v| v == column);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }
}

/// Single-month analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthKey>,
    pub row_count: usize,
    pub date_range: Option<DateRange>,
    pub daily_counts: Vec<DailyCount>,
    pub categories: Vec<CategoryShare>,
    pub modules: Vec<CategoryShare>,
    pub distinct_modules: usize,
    pub cross_tab: CrossTab,
    pub skipped_dates: usize,
}

/// Row-count change between two months
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalComparison {
    pub before: usize,
    pub after: usize,
    pub delta: i64,
    pub change_percent: f64,
}

/// Two-month comparison of categories and modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub before_month: MonthKey,
    pub after_month: MonthKey,
    pub totals: TotalComparison,
    pub categories: Vec<DeltaRecord>,
    pub modules: Vec<DeltaRecord>,
}

/// Categories with the largest increase and their trends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    pub before_month: MonthKey,
    pub after_month: MonthKey,
    pub top: Vec<DeltaRecord>,
    pub daily: DailySeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly: Option<WeeklySeries>,
}

/// One entry of the month overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthInfo {
    pub month: MonthKey,
    pub row_count: usize,
    pub distinct_modules: usize,
}

/// What the partitioner produced for the loaded table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOverview {
    pub total_rows: usize,
    pub months: Vec<MonthInfo>,
    pub dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<Synthesis>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_value_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(Value::Number(0.0));
        set.insert(Value::Number(-0.0));
        set.insert(Value::Null);
        set.insert(Value::Null);
        set.insert(Value::text("billing"));
        set.insert(Value::text("billing"));
        assert_eq!(set.len(), 3);
        assert_ne!(Value::text("1"), Value::Number(1.0));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Null.label(), "(blank)");
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2024-03-09");
    }

    #[test]
    fn test_value_as_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(d).as_date(), Some(d));
        assert_eq!(Value::text("2024-03-09").as_date(), Some(d));
        assert_eq!(Value::text("2024-03-09 10:30:00").as_date(), Some(d));
        assert_eq!(Value::text("soon").as_date(), None);
        assert_eq!(Value::Number(5.0).as_date(), None);
    }

    #[test]
    fn test_record_short_row_reads_null() {
        let record = Record::new(vec![Value::text("a")]);
        assert_eq!(record.get(0), &Value::text("a"));
        assert!(record.get(13).is_null());
    }

    #[test]
    fn test_category_stat_ranked_keeps_first_seen_on_ties() {
        let stat = CategoryStat {
            counts: vec![
                (Value::text("a"), 1),
                (Value::text("b"), 3),
                (Value::text("c"), 1),
            ],
        };
        let ranked = stat.ranked();
        assert_eq!(ranked[0].0, Value::text("b"));
        assert_eq!(ranked[1].0, Value::text("a"));
        assert_eq!(ranked[2].0, Value::text("c"));
        assert_eq!(stat.total(), 5);
        assert_eq!(stat.get(&Value::text("zzz")), 0);
    }

    #[test]
    fn test_delta_ratio_display() {
        assert_eq!(DeltaRatio::Percent(60.0).to_string(), "60.0%");
        assert_eq!(DeltaRatio::Unbounded.to_string(), "N/A");
        assert_eq!(DeltaRatio::Unbounded.percent(), None);
    }

    #[test]
    fn test_synthesis_serializes_with_kind() {
        let json = serde_json::to_string(&Synthesis::SingleMonthSplit { month: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"single_month_split","month":3}"#);
    }
}
