//! Export command implementation

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use callscope_core::export::{write_table, write_table_json};
use callscope_core::{annotate_months, ExportFormat, Session};

/// Write the loaded sheet with its month_number column
pub fn cmd_export(session: &Session, output: Option<&Path>, format: &str) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let table = session
        .table()
        .context("No call records loaded")?;
    let annotated = annotate_months(table, session.config().columns.period)
        .context("Failed to add month column")?;

    let write = |writer: Box<dyn io::Write>| -> Result<()> {
        match format {
            ExportFormat::Csv => write_table(writer, &annotated)?,
            ExportFormat::Json => write_table_json(writer, &annotated)?,
        }
        Ok(())
    };

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write(Box::new(BufWriter::new(file)))?;
            eprintln!(
                "✅ Exported {} rows as {} to {}",
                annotated.len(),
                format.as_str(),
                path.display()
            );
        }
        None => write(Box::new(io::stdout().lock()))?,
    }

    Ok(())
}
