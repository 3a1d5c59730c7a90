//! Remote spreadsheet operations.
//!
//! - `api` - the [`SpreadsheetApi`] trait and an in-memory mock
//! - `client` - Google Sheets / Drive implementation over HTTPS
//! - `range` - A1 notation helpers

pub mod api;
pub mod client;
pub mod range;

pub use api::{ApiCall, MockSpreadsheetApi, SpreadsheetApi, SpreadsheetId};
pub use client::GoogleSheetsClient;

/// Sheet id of the first sheet in a newly created spreadsheet.
pub const DEFAULT_SHEET_ID: i64 = 0;
