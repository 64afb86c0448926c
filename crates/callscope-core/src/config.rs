//! Analysis configuration
//!
//! Config is loaded with a layered resolution:
//! 1. An explicit path (the CLI's `--config`)
//! 2. An override in the user config dir (~/.config/callscope/config.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::ColumnLayout;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/callscope.toml");

/// Percentage range a chart or table shows; values outside are pinned to the edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            min: -100.0,
            max: 300.0,
        }
    }
}

impl DisplayRange {
    /// Presentation-only clamp; computed values are never rewritten
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Settings shared by every analysis of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub columns: ColumnLayout,
    /// Default number of categories in a growth report
    pub top_k: usize,
    /// Include the weekly percentage series in growth reports
    pub weekly: bool,
    pub display: DisplayRange,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnLayout::default(),
            top_k: 3,
            weekly: true,
            display: DisplayRange::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load using the layered resolution
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let content = match explicit {
            Some(path) => read_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };
        parse_config(&content)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("callscope").join("config.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Reading config from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    columns: Option<RawColumns>,
    analysis: Option<RawAnalysis>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawColumns {
    period: Option<usize>,
    event_date: Option<usize>,
    module: Option<usize>,
    category: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    top_k: Option<usize>,
    weekly: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    percent_min: Option<f64>,
    percent_max: Option<f64>,
}

/// Parse config from TOML content; missing keys keep their defaults
pub fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalysisConfig::default();

    if let Some(columns) = raw.columns {
        if let Some(period) = columns.period {
            config.columns.period = period;
        }
        if let Some(event_date) = columns.event_date {
            config.columns.event_date = event_date;
        }
        if let Some(module) = columns.module {
            config.columns.module = module;
        }
        if let Some(category) = columns.category {
            config.columns.category = category;
        }
    }

    if let Some(analysis) = raw.analysis {
        if let Some(top_k) = analysis.top_k {
            if top_k == 0 {
                return Err(Error::Config("analysis.top_k must be at least 1".into()));
            }
            config.top_k = top_k;
        }
        if let Some(weekly) = analysis.weekly {
            config.weekly = weekly;
        }
    }

    if let Some(display) = raw.display {
        if let Some(min) = display.percent_min {
            config.display.min = min;
        }
        if let Some(max) = display.percent_max {
            config.display.max = max;
        }
        if config.display.min > config.display.max {
            return Err(Error::Config(format!(
                "display.percent_min ({}) is above display.percent_max ({})",
                config.display.min, config.display.max
            )));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
[columns]
category = 5

[display]
percent_max = 500.0
"#,
        )
        .unwrap();
        assert_eq!(config.columns.category, 5);
        assert_eq!(config.columns.period, 1);
        assert_eq!(config.display.max, 500.0);
        assert_eq!(config.display.min, -100.0);
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("[analysis]\ntop_k = 0").is_err());
        assert!(parse_config("[display]\npercent_min = 10.0\npercent_max = 5.0").is_err());
        assert!(parse_config("not toml at all [").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ntop_k = 7\nweekly = false").unwrap();
        let config = AnalysisConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.top_k, 7);
        assert!(!config.weekly);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = AnalysisConfig::load(Some(Path::new("/nonexistent/callscope.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_display_clamp() {
        let range = DisplayRange::default();
        assert_eq!(range.clamp(450.0), 300.0);
        assert_eq!(range.clamp(-250.0), -100.0);
        assert_eq!(range.clamp(42.0), 42.0);
    }
}
