//! Single-month analysis and month-over-month totals

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::columns::{ColumnLayout, Field};
use crate::delta::category_counts;
use crate::error::Result;
use crate::models::{
    CategoryShare, CategoryStat, CrossTab, DailyCount, DateRange, MonthSummary, Table,
    TotalComparison, Value,
};

/// Rows and columns kept in the module x category cross-tab
pub const CROSS_TAB_LIMIT: usize = 10;

fn shares(stat: &CategoryStat, total: usize) -> Vec<CategoryShare> {
    stat.ranked()
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            percentage: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

fn cross_tab(
    table: &Table,
    layout: &ColumnLayout,
    modules: &[CategoryShare],
    categories: &[CategoryShare],
) -> CrossTab {
    let rows: Vec<Value> = modules
        .iter()
        .take(CROSS_TAB_LIMIT)
        .map(|s| s.category.clone())
        .collect();
    let columns: Vec<Value> = categories
        .iter()
        .take(CROSS_TAB_LIMIT)
        .map(|s| s.category.clone())
        .collect();

    let mut counts = vec![vec![0usize; columns.len()]; rows.len()];
    for record in &table.records {
        let module = layout.value(record, Field::Module);
        let category = layout.value(record, Field::Category);
        let r = rows.iter().position(|v| v == module);
        let c = columns.iter().position(|v| v == category);
        if let (Some(r), Some(c)) = (r, c) {
            counts[r][c] += 1;
        }
    }

    CrossTab {
        rows,
        columns,
        counts,
    }
}

/// Summarize one month's records.
///
/// Category and module columns are required; event dates that cannot be
/// read are counted in `skipped_dates` and left out of the date statistics.
pub fn summarize_month(table: &Table, layout: &ColumnLayout) -> Result<MonthSummary> {
    layout.require(table, "summary", &[Field::Category, Field::Module])?;

    let mut daily: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut skipped_dates = 0;
    for record in &table.records {
        match layout.value(record, Field::EventDate).as_date() {
            Some(date) => *daily.entry(date).or_default() += 1,
            None => skipped_dates += 1,
        }
    }

    let date_range = match (daily.keys().next(), daily.keys().next_back()) {
        (Some(from), Some(to)) => Some(DateRange {
            from: *from,
            to: *to,
        }),
        _ => None,
    };

    let total = table.len();
    let categories = shares(&category_counts(table, layout.category), total);
    let module_stat = category_counts(table, layout.module);
    let distinct_modules = module_stat
        .counts
        .iter()
        .filter(|(module, _)| !module.is_null())
        .count();
    let modules = shares(&module_stat, total);
    let cross_tab = cross_tab(table, layout, &modules, &categories);

    debug!(
        rows = total,
        categories = categories.len(),
        distinct_modules,
        skipped_dates,
        "Summarized month"
    );

    Ok(MonthSummary {
        month: None,
        row_count: total,
        date_range,
        daily_counts: daily
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        categories,
        modules,
        distinct_modules,
        cross_tab,
        skipped_dates,
    })
}

/// Row-count change between two tables; the percentage is 0 when `before` is empty
pub fn compare_totals(before: &Table, after: &Table) -> TotalComparison {
    let b = before.len();
    let a = after.len();
    TotalComparison {
        before: b,
        after: a,
        delta: a as i64 - b as i64,
        change_percent: if b > 0 {
            (a as f64 - b as f64) / b as f64 * 100.0
        } else {
            0.0
        },
    }
}
