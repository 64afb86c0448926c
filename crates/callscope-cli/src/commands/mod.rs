//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, load_session) and the config command
//! - `months` - Month listing
//! - `reports` - Summary, comparison and growth reports
//! - `export` - Month-annotated sheet export

pub mod core;
pub mod export;
pub mod months;
pub mod reports;

// Re-export command functions for main.rs
pub use core::*;
pub use export::*;
pub use months::*;
pub use reports::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
