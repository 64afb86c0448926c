//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use callscope_core::{read_table, AnalysisConfig, Session, Value, MONTH_COLUMN};
use tempfile::NamedTempFile;

use crate::commands::{self, truncate};

const HEADER: &str = "id,period,date,caller,agent,channel,priority,status,module,product,region,duration,notes,category";

fn write_sheet(rows: &[(&str, &str, &str, &str)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for (i, (period, date, module, category)) in rows.iter().enumerate() {
        writeln!(
            file,
            "{i},{period},{date},c{i},a1,phone,normal,closed,{module},p1,north,5,,{category}"
        )
        .unwrap();
    }
    file
}

fn sample_sheet() -> NamedTempFile {
    write_sheet(&[
        ("2024-03", "2024-03-04", "Billing", "billing"),
        ("2024-03", "2024-03-05", "Account", "login"),
        ("2024-04", "2024-04-01", "Account", "login"),
        ("2024-04", "2024-04-02", "Account", "login"),
        ("2024-04", "2024-04-09", "Network", "network"),
    ])
}

fn setup_session() -> Session {
    let file = sample_sheet();
    let (session, _) = commands::load_session(file.path(), AnalysisConfig::default()).unwrap();
    session
}

// ========== Shared Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long category name", 10), "a long ...");
    assert_eq!(truncate("帳務問題帳務問題", 5), "帳務...");
}

#[test]
fn test_load_session() {
    let file = sample_sheet();
    let (session, info) = commands::load_session(file.path(), AnalysisConfig::default()).unwrap();
    assert_eq!(info.rows, 5);
    assert_eq!(info.columns, 14);
    assert_eq!(session.months(), vec![3, 4]);
}

#[test]
fn test_load_session_missing_file() {
    let result = commands::load_session(
        std::path::Path::new("/nonexistent/calls.csv"),
        AnalysisConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_load_config_explicit() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[analysis]\ntop_k = 2").unwrap();
    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.top_k, 2);
    assert!(commands::cmd_config(Some(file.path()), &config, false).is_ok());
    assert!(commands::cmd_config(Some(file.path()), &config, true).is_ok());
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_months() {
    let file = sample_sheet();
    let (session, info) = commands::load_session(file.path(), AnalysisConfig::default()).unwrap();
    assert!(commands::cmd_months(&session, &info, false).is_ok());
    assert!(commands::cmd_months(&session, &info, true).is_ok());
}

#[test]
fn test_cmd_summary() {
    let session = setup_session();
    assert!(commands::cmd_summary(&session, 3, false).is_ok());
    assert!(commands::cmd_summary(&session, 4, true).is_ok());
    assert!(commands::cmd_summary(&session, 11, false).is_err());
}

#[test]
fn test_cmd_compare() {
    let session = setup_session();
    assert!(commands::cmd_compare(&session, 3, 4, false).is_ok());
    assert!(commands::cmd_compare(&session, 4, 4, false).is_err());
}

#[test]
fn test_cmd_growth() {
    let session = setup_session();
    assert!(commands::cmd_growth(&session, 3, 4, Some(2), true, false).is_ok());
    assert!(commands::cmd_growth(&session, 3, 4, None, false, true).is_ok());
    assert!(commands::cmd_growth(&session, 3, 9, None, false, false).is_err());
}

#[test]
fn test_cmd_growth_narrow_sheet() {
    // Too narrow for the period column: whole sheet is month 1, no month 2
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id\n1\n2").unwrap();
    let (session, _) = commands::load_session(file.path(), AnalysisConfig::default()).unwrap();
    assert_eq!(session.months(), vec![1]);
    assert!(commands::cmd_growth(&session, 1, 2, None, false, false).is_err());
}

// ========== Export Command Tests ==========

#[test]
fn test_cmd_export_csv() {
    let session = setup_session();
    let out = NamedTempFile::new().unwrap();
    commands::cmd_export(&session, Some(out.path()), "csv").unwrap();

    let content = std::fs::read_to_string(out.path()).unwrap();
    let table = read_table(content.as_bytes()).unwrap();
    assert_eq!(table.width(), 15);
    assert_eq!(table.header(14), Some(MONTH_COLUMN));
    assert_eq!(table.records[0].get(14), &Value::Number(3.0));
    assert_eq!(table.records[4].get(14), &Value::Number(4.0));
}

#[test]
fn test_cmd_export_json() {
    let session = setup_session();
    let out = NamedTempFile::new().unwrap();
    commands::cmd_export(&session, Some(out.path()), "json").unwrap();

    let content = std::fs::read_to_string(out.path()).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 5);
    assert_eq!(rows[0][MONTH_COLUMN], 3.0);
}

#[test]
fn test_cmd_export_unknown_format() {
    let session = setup_session();
    assert!(commands::cmd_export(&session, None, "xml").is_err());
}
