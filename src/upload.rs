//! Publishing one partition: create, share, expand the grid, write values.

use crate::config::UploadConfig;
use crate::error::Result;
use crate::sheets::range::{block_range, start_cell};
use crate::sheets::{SpreadsheetApi, SpreadsheetId, DEFAULT_SHEET_ID};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

/// Settings for a single spreadsheet upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub batch_size: usize,
    pub share: bool,
    pub share_role: String,
    pub sheet_title: String,
}

impl From<&UploadConfig> for UploadSettings {
    fn from(config: &UploadConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            share: config.share,
            share_role: config.share_role.clone(),
            sheet_title: config.sheet_title.clone(),
        }
    }
}

/// A spreadsheet that received one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedSheet {
    pub id: SpreadsheetId,
    pub title: String,
    pub url: String,
    /// Data rows written, excluding the header.
    pub rows: usize,
}

pub struct Uploader<'a, A: SpreadsheetApi + ?Sized> {
    api: &'a A,
    settings: UploadSettings,
    show_progress: bool,
}

impl<'a, A: SpreadsheetApi + ?Sized> Uploader<'a, A> {
    pub fn new(api: &'a A, settings: UploadSettings) -> Self {
        Self {
            api,
            settings,
            show_progress: false,
        }
    }

    /// Draw a progress bar while batches are written.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Create a spreadsheet titled `title` and write `headers` followed by
    /// `rows` into its first sheet.
    pub async fn upload_partition(
        &self,
        title: &str,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<UploadedSheet> {
        let id = self.create_spreadsheet(title).await?;

        let grid_rows = rows.len() + 1;
        let columns = headers.len();
        self.api
            .resize_grid(&id, DEFAULT_SHEET_ID, grid_rows, columns)
            .await?;
        info!("Expanded grid to {} rows × {} columns", grid_rows, columns);

        self.write_values(&id, headers, rows).await?;

        Ok(UploadedSheet {
            url: id.url(),
            id,
            title: title.to_string(),
            rows: rows.len(),
        })
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetId> {
        let id = self.api.create_spreadsheet(title).await?;

        if self.settings.share {
            // Sharing is best effort: the spreadsheet is still usable by its owner.
            match self
                .api
                .share_with_anyone(&id, &self.settings.share_role)
                .await
            {
                Ok(()) => info!(
                    "✓ Shared with {} access to anyone with link",
                    self.settings.share_role
                ),
                Err(e) => warn!("⚠ Could not set sharing permissions: {}", e),
            }
        }

        Ok(id)
    }

    /// Header plus rows, written top to bottom in batches of
    /// `batch_size` sheet rows.
    async fn write_values(
        &self,
        id: &SpreadsheetId,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<()> {
        let total = rows.len() + 1;
        let batch_size = self.settings.batch_size.max(1);
        let progress = self.progress_bar(total);

        for start in (0..total).step_by(batch_size) {
            let end = (start + batch_size).min(total);
            let batch: Vec<Vec<String>> = (start..end)
                .map(|i| match i {
                    0 => headers.to_vec(),
                    _ => rows[i - 1].clone(),
                })
                .collect();

            let range = start_cell(&self.settings.sheet_title, start + 1);
            debug!(
                "Writing {}",
                block_range(&self.settings.sheet_title, start + 1, batch.len(), headers.len())
            );
            self.api.update_values(id, &range, &batch).await?;

            progress.set_position(end as u64);
            info!("Uploaded rows {} → {}", start, end - 1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta}) {msg}",
        ) {
            pb.set_style(style.progress_chars("█▓▒░ "));
        }
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{ApiCall, MockSpreadsheetApi};

    fn settings(batch_size: usize) -> UploadSettings {
        UploadSettings {
            batch_size,
            share: true,
            share_role: "writer".to_string(),
            sheet_title: "Sheet1".to_string(),
        }
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_upload_call_sequence() {
        let api = MockSpreadsheetApi::new();
        let headers = row(&["a", "b"]);
        let rows = vec![row(&["1", "2"]), row(&["3", "4"])];

        let sheet = Uploader::new(&api, settings(100))
            .upload_partition("data - Part 1", &headers, &rows)
            .await
            .unwrap();

        assert_eq!(sheet.url, "https://docs.google.com/spreadsheets/d/sheet-1");
        assert_eq!(sheet.rows, 2);
        assert_eq!(
            api.get_calls().await,
            vec![
                ApiCall::Create {
                    title: "data - Part 1".into()
                },
                ApiCall::Share {
                    id: "sheet-1".into(),
                    role: "writer".into()
                },
                ApiCall::ResizeGrid {
                    id: "sheet-1".into(),
                    sheet_id: 0,
                    rows: 3,
                    columns: 2
                },
                ApiCall::UpdateValues {
                    id: "sheet-1".into(),
                    range: "Sheet1!A1".into(),
                    values: vec![headers.clone(), rows[0].clone(), rows[1].clone()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_batches_start_at_consecutive_rows() {
        let api = MockSpreadsheetApi::new();
        let headers = row(&["n"]);
        let rows: Vec<_> = (0..6).map(|i| vec![i.to_string()]).collect();

        Uploader::new(&api, settings(3))
            .upload_partition("t", &headers, &rows)
            .await
            .unwrap();

        let ranges: Vec<_> = api
            .get_calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::UpdateValues { range, values, .. } => Some((range, values.len())),
                _ => None,
            })
            .collect();
        // 7 sheet rows (header + 6) in batches of 3.
        assert_eq!(
            ranges,
            vec![
                ("Sheet1!A1".to_string(), 3),
                ("Sheet1!A4".to_string(), 3),
                ("Sheet1!A7".to_string(), 1),
            ]
        );

        let mut expected = vec![headers];
        expected.extend(rows);
        assert_eq!(api.written_rows("sheet-1").await, expected);
    }

    #[tokio::test]
    async fn test_share_failure_is_not_fatal() {
        let api = MockSpreadsheetApi::new().with_failing_share();
        let sheet = Uploader::new(&api, settings(10))
            .upload_partition("t", &row(&["h"]), &[row(&["v"])])
            .await
            .unwrap();

        assert_eq!(sheet.rows, 1);
        assert_eq!(api.written_rows("sheet-1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_sharing_disabled() {
        let api = MockSpreadsheetApi::new();
        let mut settings = settings(10);
        settings.share = false;

        Uploader::new(&api, settings)
            .upload_partition("t", &row(&["h"]), &[])
            .await
            .unwrap();

        let calls = api.get_calls().await;
        assert!(!calls.iter().any(|c| matches!(c, ApiCall::Share { .. })));
        assert!(calls.contains(&ApiCall::UpdateValues {
            id: "sheet-1".into(),
            range: "Sheet1!A1".into(),
            values: vec![row(&["h"])],
        }));
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let api = MockSpreadsheetApi::new().with_failing_update("sheet-1");
        let err = Uploader::new(&api, settings(10))
            .upload_partition("t", &row(&["h"]), &[row(&["v"])])
            .await
            .unwrap_err();
        assert!(err.is_api());
    }
}
