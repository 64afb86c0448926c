//! Month listing command

use anyhow::Result;
use callscope_core::{Session, SourceInfo};

use super::print_json;

pub fn cmd_months(session: &Session, info: &SourceInfo, json: bool) -> Result<()> {
    let overview = session.month_overview()?;
    if json {
        return print_json(&overview);
    }

    println!();
    println!("📅 Months in {}", info.name);
    println!(
        "   {} rows, {} columns",
        overview.total_rows, info.columns
    );
    println!("   ─────────────────────────────────────");

    if overview.months.is_empty() {
        println!("   No records found.");
        return Ok(());
    }

    println!("   {:>5} │ {:>8} │ {:>8}", "Month", "Rows", "Modules");
    println!("   ──────┼──────────┼──────────");
    for month in &overview.months {
        println!(
            "   {:>5} │ {:>8} │ {:>8}",
            month.month, month.row_count, month.distinct_modules
        );
    }

    if overview.dropped > 0 {
        println!();
        println!(
            "   ⚠️  {} rows had no readable month and were left out",
            overview.dropped
        );
    }
    if let Some(synthesis) = &overview.synthesis {
        println!();
        println!("   ⚠️  {}", synthesis.describe());
    }

    Ok(())
}
