//! # sheetsplit
//!
//! Upload a CSV file to Google Sheets, splitting it across as many
//! spreadsheets as the per-spreadsheet cell limit requires, and record the
//! resulting URLs.
//!
//! ## Usage
//!
//! ```bash
//! sheetsplit upload report.csv [--max-cells 9500000] [--batch-size 100000]
//! sheetsplit plan report.csv
//! ```
//!
//! ## Modules
//!
//! - `auth` - OAuth installed-app flow and token cache
//! - `cli` - Argument parsing and command routing
//! - `config` - Layered upload configuration
//! - `output` - URL list file
//! - `partition` - Row ranges that fit under the cell ceiling
//! - `pipeline` - End-to-end upload run
//! - `sheets` - Spreadsheet API trait, Google client and mock
//! - `table` - CSV loading
//! - `upload` - Publishing a single partition
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod partition;
pub mod pipeline;
pub mod sheets;
pub mod table;
pub mod upload;

pub use error::{Error, Result};
