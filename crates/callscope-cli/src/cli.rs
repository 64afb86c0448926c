//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Callscope - Month-over-month analysis of service-call records
#[derive(Parser)]
#[command(name = "callscope")]
#[command(about = "Compare service-call categories between months", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.config/callscope/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the months found in a call-record sheet
    Months {
        /// CSV export of the call-record sheet
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Summarize a single month
    Summary {
        /// CSV export of the call-record sheet
        #[arg(short, long)]
        file: PathBuf,

        /// Month number (1-12)
        #[arg(short, long)]
        month: u32,
    },

    /// Compare totals, categories and modules of two months
    Compare {
        /// CSV export of the call-record sheet
        #[arg(short, long)]
        file: PathBuf,

        /// Earlier month number
        #[arg(long)]
        before: u32,

        /// Later month number
        #[arg(long)]
        after: u32,
    },

    /// Show the fastest-growing categories with daily and weekly trends
    Growth {
        /// CSV export of the call-record sheet
        #[arg(short, long)]
        file: PathBuf,

        /// Earlier month number
        #[arg(long)]
        before: u32,

        /// Later month number
        #[arg(long)]
        after: u32,

        /// Number of categories to show (defaults to analysis.top_k)
        #[arg(short, long)]
        top: Option<usize>,

        /// Print the day-by-day counts as well
        #[arg(long)]
        daily: bool,
    },

    /// Write the sheet back out with a month_number column
    Export {
        /// CSV export of the call-record sheet
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv, json
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Show the effective configuration
    Config,
}
