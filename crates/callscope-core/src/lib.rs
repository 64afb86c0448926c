//! Callscope Core Library
//!
//! Shared functionality for analysing service-call records:
//! - CSV import with typed cells
//! - Month partitioner with pluggable month detection strategies
//! - Category delta engine: ranked changes, daily and weekly trends
//! - Single-month summaries and month-over-month comparisons
//! - Layered analysis config (columns, report size, display range)
//! - Session object holding the loaded table and its partition

pub mod columns;
pub mod config;
pub mod dates;
pub mod delta;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod partition;
pub mod session;
pub mod summary;

pub use columns::{ColumnLayout, Field};
pub use config::{AnalysisConfig, DisplayRange};
pub use delta::{
    category_counts, compare, daily_series, top_k, weekly_delta_percent,
    UNBOUNDED_WEEKLY_PERCENT,
};
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use import::{read_table, read_table_file, SourceInfo};
pub use models::*;
pub use partition::{
    annotate_months, partition, MonthExtractor, MonthStrategy, Partition, MONTH_COLUMN,
};
pub use session::Session;
pub use summary::{compare_totals, summarize_month};
