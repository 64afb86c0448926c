//! Positional column contract of the call-record sheet
//!
//! The sheet is read by position, not by header name: the period is the
//! second column (B), the event date the third (C), the module the ninth (I)
//! and the category the fourteenth (N). Every "column N means X" decision
//! lives here so a different layout only needs a config change.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Record, Table, Value};

/// Named column roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Period,
    EventDate,
    Module,
    Category,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Period => "period",
            Self::EventDate => "event_date",
            Self::Module => "module",
            Self::Category => "category",
        }
    }
}

/// Zero-based column index of each field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub period: usize,
    pub event_date: usize,
    pub module: usize,
    pub category: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            period: 1,
            event_date: 2,
            module: 8,
            category: 13,
        }
    }
}

impl ColumnLayout {
    pub fn index(&self, field: Field) -> usize {
        match field {
            Field::Period => self.period,
            Field::EventDate => self.event_date,
            Field::Module => self.module,
            Field::Category => self.category,
        }
    }

    /// Read one field of a record
    pub fn value<'a>(&self, record: &'a Record, field: Field) -> &'a Value {
        record.get(self.index(field))
    }

    /// Minimum column count needed to read all of `fields`
    pub fn required_width(&self, fields: &[Field]) -> usize {
        fields
            .iter()
            .map(|f| self.index(*f) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Fail with a schema error unless `table` has every column in `fields`
    pub fn require(&self, table: &Table, operation: &'static str, fields: &[Field]) -> Result<()> {
        require_width(table, operation, self.required_width(fields))
    }
}

/// Fail with a schema error unless `table` has at least `required` columns
pub fn require_width(table: &Table, operation: &'static str, required: usize) -> Result<()> {
    if table.width() < required {
        return Err(Error::Schema {
            operation,
            required,
            actual: table.width(),
        });
    }
    Ok(())
}
