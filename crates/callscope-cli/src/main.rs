//! Callscope CLI - Service-call month comparison
//!
//! Usage:
//!   callscope months --file calls.csv                      List months
//!   callscope summary --file calls.csv --month 3           Single-month summary
//!   callscope compare --file calls.csv --before 3 --after 4
//!   callscope growth --file calls.csv --before 3 --after 4 --top 5
//!   callscope export --file calls.csv --output annotated.csv

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Months { file } => {
            let (session, info) = commands::load_session(&file, config)?;
            commands::cmd_months(&session, &info, cli.json)
        }
        Commands::Summary { file, month } => {
            let (session, _) = commands::load_session(&file, config)?;
            commands::cmd_summary(&session, month, cli.json)
        }
        Commands::Compare {
            file,
            before,
            after,
        } => {
            let (session, _) = commands::load_session(&file, config)?;
            commands::cmd_compare(&session, before, after, cli.json)
        }
        Commands::Growth {
            file,
            before,
            after,
            top,
            daily,
        } => {
            let (session, _) = commands::load_session(&file, config)?;
            commands::cmd_growth(&session, before, after, top, daily, cli.json)
        }
        Commands::Export {
            file,
            output,
            format,
        } => {
            let (session, _) = commands::load_session(&file, config)?;
            commands::cmd_export(&session, output.as_deref(), &format)
        }
        Commands::Config => commands::cmd_config(cli.config.as_deref(), &config, cli.json),
    }
}
