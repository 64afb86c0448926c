//! Analysis session
//!
//! A `Session` owns the loaded table and its month partition. Loading a new
//! table replaces both; every analysis reads from the current partition.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::columns::Field;
use crate::config::AnalysisConfig;
use crate::delta;
use crate::error::{Error, Result};
use crate::models::{
    GrowthReport, MonthComparison, MonthInfo, MonthKey, MonthOverview, MonthSummary, Table, Value,
};
use crate::partition::{self, Partition};
use crate::summary;

pub struct Session {
    config: AnalysisConfig,
    table: Option<Table>,
    partition: Partition,
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            table: None,
            partition: Partition::default(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the loaded table and recompute its partition.
    ///
    /// A table too narrow to hold the period column is analysed as a single
    /// month instead of failing the load.
    pub fn load(&mut self, table: Table) -> &Partition {
        let partition = match partition::partition(&table, self.config.columns.period) {
            Ok(p) => p,
            Err(e) => {
                warn!("{}; treating the whole table as one month", e);
                Partition::whole_table(&table)
            }
        };
        info!(
            rows = table.len(),
            months = partition.buckets.len(),
            "Loaded table"
        );
        self.table = Some(table);
        self.partition = partition;
        &self.partition
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Month keys in ascending order
    pub fn months(&self) -> Vec<MonthKey> {
        self.partition.buckets.keys()
    }

    pub fn month(&self, key: MonthKey) -> Result<&Table> {
        self.ensure_loaded()?;
        self.partition
            .buckets
            .get(key)
            .ok_or(Error::MonthNotFound(key))
    }

    fn ensure_loaded(&self) -> Result<&Table> {
        self.table
            .as_ref()
            .ok_or_else(|| Error::EmptyInput("no data has been loaded".into()))
    }

    fn month_pair(&self, before: MonthKey, after: MonthKey) -> Result<(&Table, &Table)> {
        if before == after {
            return Err(Error::InvalidRequest(format!(
                "cannot compare month {} with itself",
                before
            )));
        }
        Ok((self.month(before)?, self.month(after)?))
    }

    /// Row count and distinct module count of each month
    pub fn month_overview(&self) -> Result<MonthOverview> {
        let table = self.ensure_loaded()?;
        let module_index = self.config.columns.module;

        let months = self
            .partition
            .buckets
            .iter()
            .map(|(month, records)| {
                let distinct: HashSet<&Value> = records
                    .column(module_index)
                    .filter(|v| !v.is_null())
                    .collect();
                MonthInfo {
                    month,
                    row_count: records.len(),
                    distinct_modules: distinct.len(),
                }
            })
            .collect();

        Ok(MonthOverview {
            total_rows: table.len(),
            months,
            dropped: self.partition.dropped,
            synthesis: self.partition.synthesis,
        })
    }

    pub fn summarize_month(&self, key: MonthKey) -> Result<MonthSummary> {
        let table = self.month(key)?;
        let mut summary = summary::summarize_month(table, &self.config.columns)?;
        summary.month = Some(key);
        Ok(summary)
    }

    /// Totals, category deltas and module deltas between two months
    pub fn compare_months(&self, before: MonthKey, after: MonthKey) -> Result<MonthComparison> {
        let (b, a) = self.month_pair(before, after)?;
        let columns = &self.config.columns;
        columns.require(b, "compare", &[Field::Category, Field::Module])?;
        columns.require(a, "compare", &[Field::Category, Field::Module])?;

        Ok(MonthComparison {
            before_month: before,
            after_month: after,
            totals: summary::compare_totals(b, a),
            categories: delta::compare(b, a, columns.category)?,
            modules: delta::compare(b, a, columns.module)?,
        })
    }

    /// Fastest-growing categories with their daily and weekly trends.
    ///
    /// `top_n` falls back to the configured `top_k`.
    pub fn analyze_growth(
        &self,
        before: MonthKey,
        after: MonthKey,
        top_n: Option<usize>,
    ) -> Result<GrowthReport> {
        let (b, a) = self.month_pair(before, after)?;
        let columns = &self.config.columns;

        let ranked = delta::compare(b, a, columns.category)?;
        let top = delta::top_k(&ranked, top_n.unwrap_or(self.config.top_k)).to_vec();
        let categories: Vec<Value> = top.iter().map(|r| r.category.clone()).collect();

        let daily = delta::daily_series(&categories, b, a, columns.category, columns.event_date)?;
        let weekly = if self.config.weekly {
            Some(delta::weekly_delta_percent(
                &categories,
                b,
                a,
                columns.category,
                columns.event_date,
            )?)
        } else {
            None
        };

        Ok(GrowthReport {
            before_month: before,
            after_month: after,
            top,
            daily,
            weekly,
        })
    }
}
