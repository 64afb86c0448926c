//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve the analysis config
//! - `load_session` - Read a call-record CSV into a session
//! - `cmd_config` - Show the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use callscope_core::config::default_config_path;
use callscope_core::{read_table_file, AnalysisConfig, Session, SourceInfo};
use tracing::debug;

use super::print_json;

pub fn load_config(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    AnalysisConfig::load(explicit).context("Failed to load config")
}

/// Read the sheet and partition it by month
pub fn load_session(file: &Path, config: AnalysisConfig) -> Result<(Session, SourceInfo)> {
    let (table, info) = read_table_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    debug!(
        "Loaded {} ({} rows, {} columns, sha256 {})",
        info.name, info.rows, info.columns, info.content_hash
    );

    let mut session = Session::new(config);
    session.load(table);
    Ok((session, info))
}

pub fn cmd_config(explicit: Option<&Path>, config: &AnalysisConfig, json: bool) -> Result<()> {
    if json {
        return print_json(config);
    }

    let source = match explicit {
        Some(path) => path.display().to_string(),
        None => match default_config_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };

    println!();
    println!("⚙️  Configuration");
    println!("   Source: {}", source);
    println!("   ─────────────────────────────────────────");
    println!("   Columns (zero-based)");
    println!("     period       {:>3}", config.columns.period);
    println!("     event_date   {:>3}", config.columns.event_date);
    println!("     module       {:>3}", config.columns.module);
    println!("     category     {:>3}", config.columns.category);
    println!("   Analysis");
    println!("     top_k        {:>3}", config.top_k);
    println!("     weekly       {}", config.weekly);
    println!("   Display range");
    println!(
        "     percent      {} to {}",
        config.display.min, config.display.max
    );

    Ok(())
}
