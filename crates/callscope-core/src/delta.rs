//! Category Delta Engine
//!
//! Compares how often each category occurs in two month subsets, ranks the
//! categories by their increase and builds daily and weekly trends for a
//! selection of them.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::columns::require_width;
use crate::dates;
use crate::error::Result;
use crate::models::{
    CategorySeries, CategoryStat, CategoryWeekly, DailySeries, DeltaRatio, DeltaRecord, Table,
    Value, WeeklyPoint, WeeklySeries,
};

/// Weekly percentage reported when a week goes from zero calls to some calls.
/// A display placeholder, not a ratio; such points are flagged `unbounded`.
pub const UNBOUNDED_WEEKLY_PERCENT: f64 = 100.0;

/// Count occurrences of each value in one column, in first-seen order
pub fn category_counts(table: &Table, category_index: usize) -> CategoryStat {
    let mut index: HashMap<&Value, usize> = HashMap::new();
    let mut counts: Vec<(Value, usize)> = Vec::new();

    for value in table.column(category_index) {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }

    CategoryStat { counts }
}

/// Percentage change from `before` to `after`
pub fn delta_ratio(before: usize, after: usize) -> DeltaRatio {
    if before == 0 {
        if after == 0 {
            DeltaRatio::Percent(0.0)
        } else {
            DeltaRatio::Unbounded
        }
    } else {
        DeltaRatio::Percent((after as f64 - before as f64) / before as f64 * 100.0)
    }
}

/// Per-category changes from `before` to `after`, largest increase first.
///
/// Every category seen in either table appears exactly once. Ties keep the
/// union order: categories of `before` as first seen, then new ones of `after`.
pub fn compare(before: &Table, after: &Table, category_index: usize) -> Result<Vec<DeltaRecord>> {
    let required = category_index + 1;
    require_width(before, "compare", required)?;
    require_width(after, "compare", required)?;

    let before_counts = category_counts(before, category_index);
    let after_counts = category_counts(after, category_index);

    let mut universe: Vec<&Value> = before_counts.counts.iter().map(|(v, _)| v).collect();
    for (value, _) in &after_counts.counts {
        if before_counts.get(value) == 0 {
            universe.push(value);
        }
    }

    let mut ranked: Vec<DeltaRecord> = universe
        .into_iter()
        .map(|category| {
            let count_before = before_counts.get(category);
            let count_after = after_counts.get(category);
            DeltaRecord {
                category: category.clone(),
                count_before,
                count_after,
                delta: count_after as i64 - count_before as i64,
                delta_ratio: delta_ratio(count_before, count_after),
            }
        })
        .collect();

    // Stable: equal deltas keep union order
    ranked.sort_by(|a, b| b.delta.cmp(&a.delta));

    debug!(
        categories = ranked.len(),
        before = before.len(),
        after = after.len(),
        "Compared category counts"
    );
    Ok(ranked)
}

/// First `n` ranked entries, with `n` clamped to `[1, ranked.len()]`
pub fn top_k(ranked: &[DeltaRecord], n: usize) -> &[DeltaRecord] {
    if ranked.is_empty() {
        return ranked;
    }
    &ranked[..n.clamp(1, ranked.len())]
}

/// Rows of both tables with a readable event date, plus the count of unreadable ones
struct DatedRows<'a> {
    before: Vec<(&'a Value, NaiveDate)>,
    after: Vec<(&'a Value, NaiveDate)>,
    skipped: usize,
}

impl<'a> DatedRows<'a> {
    fn collect(
        before: &'a Table,
        after: &'a Table,
        category_index: usize,
        date_index: usize,
    ) -> Self {
        let mut skipped = 0;
        let mut read = |table: &'a Table| -> Vec<(&'a Value, NaiveDate)> {
            table
                .records
                .iter()
                .filter_map(|r| match r.get(date_index).as_date() {
                    Some(date) => Some((r.get(category_index), date)),
                    None => {
                        skipped += 1;
                        None
                    }
                })
                .collect()
        };
        let before_rows = read(before);
        let after_rows = read(after);
        if skipped > 0 {
            debug!(skipped, "Rows without a readable event date were left out of the trend");
        }
        Self {
            before: before_rows,
            after: after_rows,
            skipped,
        }
    }

    fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.before.iter().chain(&self.after).map(|(_, d)| *d);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

fn check_trend_schema(
    before: &Table,
    after: &Table,
    category_index: usize,
    date_index: usize,
) -> Result<()> {
    let required = category_index.max(date_index) + 1;
    require_width(before, "trend", required)?;
    require_width(after, "trend", required)
}

/// Dense daily counts of each category over the combined date range.
///
/// Every series has one entry per day from the earliest to the latest event
/// date of both tables; days without calls are 0.
pub fn daily_series(
    categories: &[Value],
    before: &Table,
    after: &Table,
    category_index: usize,
    date_index: usize,
) -> Result<DailySeries> {
    check_trend_schema(before, after, category_index, date_index)?;

    let rows = DatedRows::collect(before, after, category_index, date_index);
    let Some((start, end)) = rows.range() else {
        debug!("No readable event dates; daily series is empty");
        return Ok(DailySeries {
            skipped_dates: rows.skipped,
            ..Default::default()
        });
    };

    let days = dates::days_inclusive(start, end);
    let series = categories
        .iter()
        .map(|category| {
            let mut counts = vec![0usize; days.len()];
            for (value, date) in rows.before.iter().chain(&rows.after) {
                if *value == category {
                    counts[(*date - start).num_days() as usize] += 1;
                }
            }
            CategorySeries {
                category: category.clone(),
                counts,
            }
        })
        .collect();

    Ok(DailySeries {
        dates: days,
        series,
        skipped_dates: rows.skipped,
    })
}

/// Percentage change of a week's count; see [`UNBOUNDED_WEEKLY_PERCENT`]
pub fn weekly_percent(before: usize, after: usize) -> (f64, bool) {
    if before > 0 {
        ((after as f64 - before as f64) / before as f64 * 100.0, false)
    } else if after == 0 {
        (0.0, false)
    } else {
        (UNBOUNDED_WEEKLY_PERCENT, true)
    }
}

/// Week-by-week percentage change of each category between the two tables.
///
/// Weeks start on Monday and run from the week of the earliest event date to
/// the week of the latest one.
pub fn weekly_delta_percent(
    categories: &[Value],
    before: &Table,
    after: &Table,
    category_index: usize,
    date_index: usize,
) -> Result<WeeklySeries> {
    check_trend_schema(before, after, category_index, date_index)?;

    let rows = DatedRows::collect(before, after, category_index, date_index);
    let Some((start, end)) = rows.range() else {
        return Ok(WeeklySeries {
            skipped_dates: rows.skipped,
            ..Default::default()
        });
    };

    let first_week = dates::week_start(start);
    let last_week = dates::week_start(end);
    let weeks: Vec<NaiveDate> = std::iter::successors(Some(first_week), |w| {
        Some(*w + Duration::days(7)).filter(|next| *next <= last_week)
    })
    .collect();

    let week_counts = |side: &[(&Value, NaiveDate)], category: &Value| {
        let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
        for (value, date) in side {
            if *value == category {
                *counts.entry(dates::week_start(*date)).or_default() += 1;
            }
        }
        counts
    };

    let series = categories
        .iter()
        .map(|category| {
            let before_weeks = week_counts(&rows.before, category);
            let after_weeks = week_counts(&rows.after, category);
            let points = weeks
                .iter()
                .map(|week| {
                    let count_before = before_weeks.get(week).copied().unwrap_or(0);
                    let count_after = after_weeks.get(week).copied().unwrap_or(0);
                    let (percent, unbounded) = weekly_percent(count_before, count_after);
                    WeeklyPoint {
                        week_start: *week,
                        count_before,
                        count_after,
                        percent,
                        unbounded,
                    }
                })
                .collect();
            CategoryWeekly {
                category: category.clone(),
                points,
            }
        })
        .collect();

    Ok(WeeklySeries {
        weeks,
        series,
        skipped_dates: rows.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    const CAT: usize = 1;
    const DATE: usize = 0;

    fn table(rows: &[(&str, &str)]) -> Table {
        let records = rows
            .iter()
            .map(|(date, cat)| {
                Record::new(vec![
                    crate::import::infer_value(date),
                    crate::import::infer_value(cat),
                ])
            })
            .collect();
        Table::with_records(vec!["date".into(), "category".into()], records)
    }

    fn repeat(cat: &'static str, n: usize) -> Vec<(&'static str, &'static str)> {
        vec![("2024-03-01", cat); n]
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_counts_include_blank() {
        let t = table(&[("2024-03-01", "a"), ("2024-03-01", ""), ("2024-03-02", "a")]);
        let stat = category_counts(&t, CAT);
        assert_eq!(stat.get(&Value::text("a")), 2);
        assert_eq!(stat.get(&Value::Null), 1);
        assert_eq!(stat.counts[0].0, Value::text("a"));
    }

    #[test]
    fn test_compare_example() {
        let mut a = repeat("billing", 3);
        a.extend(repeat("login", 5));
        let mut b = repeat("billing", 3);
        b.extend(repeat("login", 8));
        b.extend(repeat("network", 2));

        let ranked = compare(&table(&a), &table(&b), CAT).unwrap();
        assert_eq!(ranked.len(), 3);

        // Largest delta first: login +3 ranks above network +2
        assert_eq!(ranked[0].category, Value::text("login"));
        assert_eq!(ranked[0].delta, 3);
        assert_eq!(ranked[0].delta_ratio, DeltaRatio::Percent(60.0));

        assert_eq!(ranked[1].category, Value::text("network"));
        assert_eq!(ranked[1].delta, 2);
        assert_eq!(ranked[1].count_before, 0);
        assert_eq!(ranked[1].delta_ratio, DeltaRatio::Unbounded);

        assert_eq!(ranked[2].category, Value::text("billing"));
        assert_eq!(ranked[2].delta, 0);
        assert_eq!(ranked[2].delta_ratio, DeltaRatio::Percent(0.0));
    }

    #[test]
    fn test_compare_ties_keep_union_order() {
        let a = table(&[("2024-03-01", "x"), ("2024-03-01", "y")]);
        let b = table(&[
            ("2024-03-01", "z"),
            ("2024-03-01", "y"),
            ("2024-03-01", "x"),
        ]);
        let ranked = compare(&a, &b, CAT).unwrap();
        let order: Vec<String> = ranked.iter().map(|r| r.category.to_string()).collect();
        // z is +1; x and y tie at 0 and keep the order they were first seen in `a`
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_compare_delta_invariant_and_decreases() {
        let a = table(&[("2024-03-01", "x"), ("2024-03-01", "x"), ("2024-03-01", "")]);
        let b = table(&[("2024-03-01", "")]);
        let ranked = compare(&a, &b, CAT).unwrap();
        for r in &ranked {
            assert_eq!(r.delta, r.count_after as i64 - r.count_before as i64);
        }
        assert_eq!(ranked[0].category, Value::Null);
        assert_eq!(ranked[1].delta_ratio, DeltaRatio::Percent(-100.0));
    }

    #[test]
    fn test_compare_requires_category_column() {
        let a = table(&[("2024-03-01", "x")]);
        let err = compare(&a, &a, 13).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("at least 14 columns"));
    }

    #[test]
    fn test_compare_empty_tables() {
        let empty = table(&[]);
        assert!(compare(&empty, &empty, CAT).unwrap().is_empty());
    }

    #[test]
    fn test_top_k_clamps() {
        let a = table(&[]);
        let b = table(&[("2024-03-01", "x"), ("2024-03-01", "y"), ("2024-03-01", "z")]);
        let ranked = compare(&a, &b, CAT).unwrap();
        assert_eq!(top_k(&ranked, 0).len(), 1);
        assert_eq!(top_k(&ranked, 2).len(), 2);
        assert_eq!(top_k(&ranked, 10).len(), 3);
        assert!(top_k(&[], 5).is_empty());
    }

    #[test]
    fn test_daily_series_zero_fills_gap() {
        let a = table(&[("2024-03-01", "login"), ("2024-03-02", "login")]);
        // 2024-03-03 has no calls at all
        let b = table(&[
            ("2024-03-04", "login"),
            ("2024-03-04", "login"),
            ("2024-03-02", "billing"),
        ]);
        let cats = vec![Value::text("login"), Value::text("billing")];
        let daily = daily_series(&cats, &a, &b, CAT, DATE).unwrap();

        assert_eq!(daily.dates.len(), 4);
        assert_eq!(daily.start(), Some(ymd(2024, 3, 1)));
        assert_eq!(daily.end(), Some(ymd(2024, 3, 4)));
        assert_eq!(daily.series[0].counts, vec![1, 1, 0, 2]);
        assert_eq!(daily.series[1].counts, vec![0, 1, 0, 0]);
        for s in &daily.series {
            assert_eq!(s.counts.len(), (ymd(2024, 3, 4) - ymd(2024, 3, 1)).num_days() as usize + 1);
        }
    }

    #[test]
    fn test_daily_series_skips_bad_dates() {
        let a = table(&[("not a date", "login"), ("2024-03-01", "login")]);
        let b = table(&[("2024-03-01 14:00:00", "login")]);
        let daily = daily_series(&[Value::text("login")], &a, &b, CAT, DATE).unwrap();
        assert_eq!(daily.skipped_dates, 1);
        assert_eq!(daily.series[0].counts, vec![2]);
    }

    #[test]
    fn test_daily_series_without_dates_is_empty() {
        let a = table(&[("", "login")]);
        let daily = daily_series(&[Value::text("login")], &a, &a, CAT, DATE).unwrap();
        assert!(daily.dates.is_empty());
        assert!(daily.series.is_empty());
        assert_eq!(daily.skipped_dates, 2);
    }

    #[test]
    fn test_weekly_percent_rules() {
        assert_eq!(weekly_percent(0, 0), (0.0, false));
        assert_eq!(weekly_percent(0, 4), (UNBOUNDED_WEEKLY_PERCENT, true));
        assert_eq!(weekly_percent(4, 6), (50.0, false));
        assert_eq!(weekly_percent(4, 0), (-100.0, false));
    }

    #[test]
    fn test_weekly_delta_percent() {
        // 2024-03-04 and 2024-03-11 are Mondays
        let a = table(&[
            ("2024-03-05", "login"),
            ("2024-03-06", "login"),
            ("2024-03-12", "billing"),
        ]);
        let b = table(&[
            ("2024-03-07", "login"),
            ("2024-03-08", "login"),
            ("2024-03-09", "login"),
            ("2024-03-13", "login"),
            ("2024-03-14", "login"),
        ]);
        let cats = vec![Value::text("login"), Value::text("billing")];
        let weekly = weekly_delta_percent(&cats, &a, &b, CAT, DATE).unwrap();

        assert_eq!(weekly.weeks, vec![ymd(2024, 3, 4), ymd(2024, 3, 11)]);

        let login = &weekly.series[0].points;
        assert_eq!(login[0].count_before, 2);
        assert_eq!(login[0].count_after, 3);
        assert_eq!(login[0].percent, 50.0);
        // No calls before, two after: sentinel, flagged
        assert_eq!(login[1].percent, UNBOUNDED_WEEKLY_PERCENT);
        assert!(login[1].unbounded);

        let billing = &weekly.series[1].points;
        assert_eq!(billing[0].percent, 0.0);
        assert_eq!(billing[1].percent, -100.0);
    }

    #[test]
    fn test_weekly_values_not_clamped() {
        let a = table(&[("2024-03-04", "x")]);
        let b = table(&vec![("2024-03-05", "x"); 6]);
        let weekly = weekly_delta_percent(&[Value::text("x")], &a, &b, CAT, DATE).unwrap();
        assert_eq!(weekly.series[0].points[0].percent, 500.0);
    }
}
