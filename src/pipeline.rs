//! End-to-end run: load the CSV, plan partitions, upload each, record URLs.

use crate::config::UploadConfig;
use crate::error::Result;
use crate::output::{base_filename, default_output_path, write_url_list};
use crate::partition::PartitionPlan;
use crate::sheets::SpreadsheetApi;
use crate::table::Table;
use crate::upload::{UploadSettings, UploadedSheet, Uploader};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sheets: Vec<UploadedSheet>,
    pub output: PathBuf,
}

/// Load `csv_path` and compute its partition plan without touching the network.
pub fn plan(csv_path: &Path, max_cells: usize) -> Result<(Table, PartitionPlan)> {
    let table = Table::from_path(csv_path)?;
    let plan = PartitionPlan::new(table.row_count(), table.column_count(), max_cells)?;
    Ok((table, plan))
}

/// Upload every partition of `csv_path` in order and write the URL list.
///
/// Any failure other than sharing aborts the run; spreadsheets created
/// before the failure are left in place.
pub async fn run<A: SpreadsheetApi + ?Sized>(
    csv_path: &Path,
    config: &UploadConfig,
    api: &A,
    show_progress: bool,
) -> Result<RunSummary> {
    let (table, plan) = plan(csv_path, config.max_cells)?;

    info!(
        "CSV: {} rows × {} columns",
        table.row_count(),
        table.column_count()
    );
    info!("Max rows per Google Sheet: {}", plan.rows_per_partition);
    let total = plan.partition_count();
    info!("Total sheets needed: {}", total);

    let base = base_filename(csv_path);
    let prefix = config.title_prefix.clone().unwrap_or_else(|| base.clone());
    let uploader =
        Uploader::new(api, UploadSettings::from(config)).with_progress(show_progress);

    let mut sheets = Vec::with_capacity(total);
    for part in plan.partitions() {
        let rows = &table.rows[part.range()];
        let title = format!("{} - Part {}", prefix, part.number());
        info!(
            "Creating sheet {}/{}: {} rows",
            part.number(),
            total,
            rows.len()
        );

        let sheet = uploader
            .upload_partition(&title, &table.headers, rows)
            .await?;
        sheets.push(sheet);
    }

    let output = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&base));
    write_url_list(&output, &sheets)?;
    info!("✓ URLs saved to: {}", output.display());

    Ok(RunSummary { sheets, output })
}
