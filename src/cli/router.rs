//! Command routing and execution

use crate::auth::authenticate;
use crate::cli::args::{AuthArgs, Commands};
use crate::config::UploadConfig;
use crate::pipeline;
use crate::sheets::GoogleSheetsClient;
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Upload {
            csv,
            auth,
            output,
            max_cells,
            batch_size,
            no_share,
            title_prefix,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            apply_auth_args(&mut config, &auth);
            if output.is_some() {
                config.output = output;
            }
            if let Some(max_cells) = max_cells {
                config.max_cells = max_cells;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            if no_share {
                config.share = false;
            }
            if title_prefix.is_some() {
                config.title_prefix = title_prefix;
            }
            config.validate()?;
            run_upload(&csv, &config).await
        }
        Commands::Plan {
            csv,
            max_cells,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(max_cells) = max_cells {
                config.max_cells = max_cells;
            }
            config.validate()?;
            run_plan(&csv, &config)
        }
        Commands::Auth { auth, config } => {
            let mut config = UploadConfig::load_for_auth(config.as_deref())
                .context("Failed to load configuration")?;
            apply_auth_args(&mut config, &auth);
            run_auth(&config).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<UploadConfig> {
    let config = UploadConfig::load(path).context("Failed to load configuration")?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn apply_auth_args(config: &mut UploadConfig, auth: &AuthArgs) {
    if let Some(credentials) = &auth.credentials {
        config.credentials = credentials.clone();
    }
    if let Some(token) = &auth.token {
        config.token = token.clone();
    }
}

async fn run_upload(csv: &Path, config: &UploadConfig) -> Result<()> {
    if !csv.exists() {
        anyhow::bail!("CSV file not found: {}", csv.display());
    }

    let http = reqwest::Client::new();
    let user = authenticate(&http, &config.credentials, &config.token)
        .await
        .context("Authentication failed")?;
    let client = GoogleSheetsClient::new(user.access_token()?.to_string())?;

    let show_progress = std::io::stderr().is_terminal();
    let summary = pipeline::run(csv, config, &client, show_progress)
        .await
        .with_context(|| format!("Upload of {} failed", csv.display()))?;

    println!("\n✓ URLs saved to: {}", summary.output.display());
    for sheet in &summary.sheets {
        println!("{}", sheet.url);
    }
    Ok(())
}

fn run_plan(csv: &Path, config: &UploadConfig) -> Result<()> {
    let (table, plan) = pipeline::plan(csv, config.max_cells)
        .with_context(|| format!("Cannot plan {}", csv.display()))?;

    println!(
        "CSV: {} rows × {} columns",
        table.row_count(),
        table.column_count()
    );
    println!("Max rows per Google Sheet: {}", plan.rows_per_partition);
    println!("Total sheets needed: {}", plan.partition_count());
    for part in plan.partitions() {
        println!(
            "  Part {}: rows {} → {} ({} rows)",
            part.number(),
            part.start,
            part.end - 1,
            part.len()
        );
    }
    Ok(())
}

async fn run_auth(config: &UploadConfig) -> Result<()> {
    let http = reqwest::Client::new();
    authenticate(&http, &config.credentials, &config.token)
        .await
        .context("Authentication failed")?;
    println!("✓ Token cached at {}", config.token.display());
    Ok(())
}
