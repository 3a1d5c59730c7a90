//! Spreadsheet service abstraction
//!
//! Provides a trait over the handful of remote operations an upload needs,
//! so the pipeline can be exercised without network access.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Identifier of a remote spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpreadsheetId(pub String);

impl SpreadsheetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Browser URL for the spreadsheet.
    pub fn url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.0)
    }
}

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote operations used to publish one partition.
#[async_trait]
pub trait SpreadsheetApi: Send + Sync {
    /// Create an empty spreadsheet with the given title.
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetId>;

    /// Grant `role` on the spreadsheet to anyone holding the link.
    async fn share_with_anyone(&self, id: &SpreadsheetId, role: &str) -> Result<()>;

    /// Set the grid size of sheet `sheet_id`.
    async fn resize_grid(
        &self,
        id: &SpreadsheetId,
        sheet_id: i64,
        rows: usize,
        columns: usize,
    ) -> Result<()>;

    /// Write `values` starting at the A1 `range`, stored without parsing.
    async fn update_values(
        &self,
        id: &SpreadsheetId,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<()>;
}

/// One recorded call against [`MockSpreadsheetApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create {
        title: String,
    },
    Share {
        id: String,
        role: String,
    },
    ResizeGrid {
        id: String,
        sheet_id: i64,
        rows: usize,
        columns: usize,
    },
    UpdateValues {
        id: String,
        range: String,
        values: Vec<Vec<String>>,
    },
}

/// In-memory implementation for tests: records every call and hands out
/// sequential ids (`sheet-1`, `sheet-2`, ...).
#[derive(Clone, Default)]
pub struct MockSpreadsheetApi {
    pub calls: Arc<Mutex<Vec<ApiCall>>>,
    /// Make every `share_with_anyone` call fail.
    pub fail_share: bool,
    /// Make `update_values` fail for this spreadsheet id.
    pub fail_update_for: Option<String>,
}

impl MockSpreadsheetApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_failing_share(mut self) -> Self {
        self.fail_share = true;
        self
    }

    #[must_use]
    pub fn with_failing_update(mut self, id: &str) -> Self {
        self.fail_update_for = Some(id.to_string());
        self
    }

    pub async fn get_calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    /// Values written to one spreadsheet, concatenated in call order.
    pub async fn written_rows(&self, id: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ApiCall::UpdateValues {
                    id: call_id,
                    values,
                    ..
                } if call_id == id => Some(values.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[async_trait]
impl SpreadsheetApi for MockSpreadsheetApi {
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetId> {
        let mut calls = self.calls.lock().await;
        calls.push(ApiCall::Create {
            title: title.to_string(),
        });
        let created = calls
            .iter()
            .filter(|c| matches!(c, ApiCall::Create { .. }))
            .count();
        Ok(SpreadsheetId(format!("sheet-{created}")))
    }

    async fn share_with_anyone(&self, id: &SpreadsheetId, role: &str) -> Result<()> {
        self.calls.lock().await.push(ApiCall::Share {
            id: id.to_string(),
            role: role.to_string(),
        });
        if self.fail_share {
            return Err(Error::Api {
                status: 403,
                message: "The user does not have sufficient permissions for this file."
                    .to_string(),
            });
        }
        Ok(())
    }

    async fn resize_grid(
        &self,
        id: &SpreadsheetId,
        sheet_id: i64,
        rows: usize,
        columns: usize,
    ) -> Result<()> {
        self.calls.lock().await.push(ApiCall::ResizeGrid {
            id: id.to_string(),
            sheet_id,
            rows,
            columns,
        });
        Ok(())
    }

    async fn update_values(
        &self,
        id: &SpreadsheetId,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<()> {
        if self.fail_update_for.as_deref() == Some(id.as_str()) {
            return Err(Error::Api {
                status: 429,
                message: "Quota exceeded for quota metric 'Write requests'".to_string(),
            });
        }
        self.calls.lock().await.push(ApiCall::UpdateValues {
            id: id.to_string(),
            range: range.to_string(),
            values: values.to_vec(),
        });
        Ok(())
    }
}
