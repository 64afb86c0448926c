//! Report command implementations
//!
//! Percentages are pinned to the configured display range when printed;
//! `--json` output carries the computed values unchanged.

use anyhow::Result;
use callscope_core::{DeltaRatio, DeltaRecord, DisplayRange, MonthKey, Session};

use super::{print_json, truncate};

/// Percentage cell for a delta ratio; unbounded growth has no ratio
fn format_ratio(ratio: &DeltaRatio, range: &DisplayRange) -> String {
    match ratio.percent() {
        Some(p) => format!("{:+.1}%", range.clamp(p)),
        None => "N/A".to_string(),
    }
}

fn print_delta_table(title: &str, rows: &[DeltaRecord], range: &DisplayRange) {
    println!("   {}", title);
    println!(
        "   {:25} │ {:>7} │ {:>7} │ {:>7} │ {:>8}",
        "", "Before", "After", "Δ", "%"
    );
    println!("   ──────────────────────────┼─────────┼─────────┼─────────┼──────────");
    for row in rows {
        println!(
            "   {:25} │ {:>7} │ {:>7} │ {:>+7} │ {:>8}",
            truncate(&row.category.label(), 25),
            row.count_before,
            row.count_after,
            row.delta,
            format_ratio(&row.delta_ratio, range)
        );
    }
}

pub fn cmd_summary(session: &Session, month: MonthKey, json: bool) -> Result<()> {
    let summary = session.summarize_month(month)?;
    if json {
        return print_json(&summary);
    }

    println!();
    println!("📊 Month {} Summary", month);
    if let Some(range) = &summary.date_range {
        println!("   Period: {} to {}", range.from, range.to);
    }
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Calls: {}    Modules: {}",
        summary.row_count, summary.distinct_modules
    );
    if summary.skipped_dates > 0 {
        println!("   Rows without a readable date: {}", summary.skipped_dates);
    }

    if summary.row_count == 0 {
        println!("   No calls in this month.");
        return Ok(());
    }

    println!();
    println!("   {:25} │ {:>6} │ {:>6}", "Category", "Count", "%");
    println!("   ──────────────────────────┼────────┼────────");
    for share in &summary.categories {
        println!(
            "   {:25} │ {:>6} │ {:>5.1}%",
            truncate(&share.category.label(), 25),
            share.count,
            share.percentage
        );
    }

    println!();
    println!("   {:25} │ {:>6} │ {:>6}", "Module", "Count", "%");
    println!("   ──────────────────────────┼────────┼────────");
    for share in &summary.modules {
        println!(
            "   {:25} │ {:>6} │ {:>5.1}%",
            truncate(&share.category.label(), 25),
            share.count,
            share.percentage
        );
    }

    if !summary.daily_counts.is_empty() {
        let busiest = summary
            .daily_counts
            .iter()
            .max_by_key(|d| d.count)
            .map(|d| (d.date, d.count));
        if let Some((date, count)) = busiest {
            println!();
            println!("   Busiest day: {} ({} calls)", date, count);
        }
    }

    Ok(())
}

pub fn cmd_compare(session: &Session, before: MonthKey, after: MonthKey, json: bool) -> Result<()> {
    let comparison = session.compare_months(before, after)?;
    if json {
        return print_json(&comparison);
    }
    let range = &session.config().display;
    let totals = &comparison.totals;

    println!();
    println!("📈 Month {} → Month {}", before, after);
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Calls: {} → {} ({:+}, {:+.1}%)",
        totals.before,
        totals.after,
        totals.delta,
        range.clamp(totals.change_percent)
    );
    println!();
    print_delta_table("Categories", &comparison.categories, range);
    println!();
    print_delta_table("Modules", &comparison.modules, range);

    Ok(())
}

pub fn cmd_growth(
    session: &Session,
    before: MonthKey,
    after: MonthKey,
    top: Option<usize>,
    show_daily: bool,
    json: bool,
) -> Result<()> {
    let report = session.analyze_growth(before, after, top)?;
    if json {
        return print_json(&report);
    }
    let range = &session.config().display;

    println!();
    println!("🚀 Fastest-growing categories, month {} → {}", before, after);
    println!("   ─────────────────────────────────────────────");
    if report.top.is_empty() {
        println!("   No categories to compare.");
        return Ok(());
    }
    print_delta_table("Top categories", &report.top, range);

    if show_daily && !report.daily.dates.is_empty() {
        println!();
        println!("   Daily calls");
        let header: Vec<String> = report
            .daily
            .series
            .iter()
            .map(|s| format!("{:>10}", truncate(&s.category.label(), 10)))
            .collect();
        println!("   {:10} │ {}", "Date", header.join(" │ "));
        for (i, date) in report.daily.dates.iter().enumerate() {
            let cells: Vec<String> = report
                .daily
                .series
                .iter()
                .map(|s| format!("{:>10}", s.counts[i]))
                .collect();
            println!("   {:10} │ {}", date.format("%Y-%m-%d"), cells.join(" │ "));
        }
    }

    if let Some(weekly) = &report.weekly {
        if !weekly.weeks.is_empty() {
            println!();
            println!("   Weekly change (weeks starting Monday)");
            let header: Vec<String> = weekly
                .series
                .iter()
                .map(|s| format!("{:>10}", truncate(&s.category.label(), 10)))
                .collect();
            println!("   {:10} │ {}", "Week", header.join(" │ "));
            for (i, week) in weekly.weeks.iter().enumerate() {
                let cells: Vec<String> = weekly
                    .series
                    .iter()
                    .map(|s| {
                        let point = &s.points[i];
                        let mark = if point.unbounded { "*" } else { " " };
                        format!("{:>+9.1}%{}", range.clamp(point.percent), mark)
                    })
                    .collect();
                println!("   {:10} │ {}", week.format("%Y-%m-%d"), cells.join(" │ "));
            }
            println!("   * no calls in the earlier month that week");
        }
    }

    let skipped = report.daily.skipped_dates;
    if skipped > 0 {
        println!();
        println!("   ⚠️  {} rows had no readable date and are not in the trends", skipped);
    }

    Ok(())
}
