//! CLI argument structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Upload large CSV files to Google Sheets
#[derive(Parser)]
#[command(name = "sheetsplit")]
#[command(about = "sheetsplit - Upload large CSV files to Google Sheets, split under the cell limit", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a CSV file, one spreadsheet per partition
    #[command(name = "upload")]
    Upload {
        /// CSV file to upload (first row is the header)
        csv: PathBuf,

        #[command(flatten)]
        auth: AuthArgs,

        /// File receiving the spreadsheet URLs (default: <csv stem>_sheet_urls.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum cells per spreadsheet, header row included
        #[arg(long, value_name = "CELLS")]
        max_cells: Option<usize>,

        /// Rows written per request
        #[arg(long, value_name = "ROWS")]
        batch_size: Option<usize>,

        /// Do not share spreadsheets with anyone holding the link
        #[arg(long)]
        no_share: bool,

        /// Title prefix for created spreadsheets (default: CSV file stem)
        #[arg(long, value_name = "TITLE")]
        title_prefix: Option<String>,

        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Show how a CSV file would be partitioned, without uploading
    #[command(name = "plan")]
    Plan {
        /// CSV file to inspect
        csv: PathBuf,

        /// Maximum cells per spreadsheet, header row included
        #[arg(long, value_name = "CELLS")]
        max_cells: Option<usize>,

        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Authorize access and cache the token
    #[command(name = "auth")]
    Auth {
        #[command(flatten)]
        auth: AuthArgs,

        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// OAuth client secrets file
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Cached token file
    #[arg(long, value_name = "PATH")]
    pub token: Option<PathBuf>,
}
