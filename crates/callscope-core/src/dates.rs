//! Date parsing helpers shared by import, the partitioner and the delta engine

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Format plus the index of the digit group holding its `%Y` year; that group
/// must be four digits for the format to apply.
const DATE_FORMATS: &[(&str, Option<usize>)] = &[
    ("%Y-%m-%d", Some(0)),     // 2024-01-15
    ("%Y/%m/%d", Some(0)),     // 2024/01/15
    ("%m/%d/%Y", Some(2)),     // 01/15/2024
    ("%m/%d/%y", None),        // 01/15/24
    ("%Y.%m.%d", Some(0)),     // 2024.01.15
    ("%Y年%m月%d日", Some(0)), // 2024年1月15日
];

const DATETIME_FORMATS: &[(&str, Option<usize>)] = &[
    ("%Y-%m-%d %H:%M:%S", Some(0)),
    ("%Y-%m-%dT%H:%M:%S", Some(0)),
    ("%Y-%m-%d %H:%M", Some(0)),
    ("%Y/%m/%d %H:%M:%S", Some(0)),
    ("%Y/%m/%d %H:%M", Some(0)),
    ("%m/%d/%Y %H:%M:%S", Some(2)),
    ("%m/%d/%Y %H:%M", Some(2)),
    ("%m/%d/%y %H:%M", None),
];

/// Length of the `n`-th run of ASCII digits in `s`
fn digit_group_len(s: &str, n: usize) -> usize {
    s.split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .nth(n)
        .map_or(0, str::len)
}

fn year_fits(s: &str, year_group: Option<usize>) -> bool {
    year_group.map_or(true, |n| digit_group_len(s, n) == 4)
}

/// Parse a calendar date in one of the common spreadsheet export formats
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .filter(|(_, year)| year_fits(s, *year))
        .find_map(|(fmt, _)| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a date with a time of day
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .filter(|(_, year)| year_fits(s, *year))
        .find_map(|(fmt, _)| NaiveDateTime::parse_from_str(s, fmt).ok())
        // Fractional seconds as written by pandas/Excel exports
        .or_else(|| {
            if !year_fits(s, Some(0)) {
                return None;
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()
        })
}

/// Parse a year-month period such as `2024-03`, `2024/03` or `2024年3月`
pub fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let (year, month) = if let Some(rest) = s.strip_suffix('月') {
        let (y, m) = rest.split_once('年')?;
        (y, m)
    } else {
        s.split_once(['-', '/'])?
    };
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    // Two-digit or ROC years are not calendar years
    if year < 1000 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Every date from `from` to `to`, inclusive
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}
