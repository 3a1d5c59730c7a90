//! Google Sheets v4 / Drive v3 REST client

use super::api::{SpreadsheetApi, SpreadsheetId};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/";
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";

pub struct GoogleSheetsClient {
    client: Client,
    access_token: String,
    sheets_base: Url,
    drive_base: Url,
}

impl GoogleSheetsClient {
    pub fn new(access_token: String) -> Result<Self> {
        Self::with_base_urls(access_token, SHEETS_BASE_URL, DRIVE_BASE_URL)
    }

    /// Point the client at other endpoints, e.g. a local test server.
    pub fn with_base_urls(access_token: String, sheets_base: &str, drive_base: &str) -> Result<Self> {
        // Large batches of values can take a while to be accepted.
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Self::from_parts(client, access_token, sheets_base, drive_base)
    }

    pub fn from_parts(
        client: Client,
        access_token: String,
        sheets_base: &str,
        drive_base: &str,
    ) -> Result<Self> {
        Ok(Self {
            client,
            access_token,
            sheets_base: Url::parse(sheets_base)?,
            drive_base: Url::parse(drive_base)?,
        })
    }

    fn sheets_url(&self, segments: &[&str]) -> Result<Url> {
        build_url(&self.sheets_base, segments)
    }

    fn drive_url(&self, segments: &[&str]) -> Result<Url> {
        build_url(&self.drive_base, segments)
    }
}

fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("Base URL cannot have a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

/// Turn a non-success response into `Error::Api`, preferring the message
/// from Google's JSON error envelope.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<GoogleErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl SpreadsheetApi for GoogleSheetsClient {
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetId> {
        let mut url = self.sheets_url(&["spreadsheets"])?;
        url.query_pairs_mut().append_pair("fields", "spreadsheetId");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "properties": { "title": title } }))
            .send()
            .await?;
        let created: CreateResponse = check_status(response).await?.json().await?;

        debug!("Created spreadsheet {} ({})", created.spreadsheet_id, title);
        Ok(SpreadsheetId(created.spreadsheet_id))
    }

    async fn share_with_anyone(&self, id: &SpreadsheetId, role: &str) -> Result<()> {
        let mut url = self.drive_url(&["files", id.as_str(), "permissions"])?;
        url.query_pairs_mut().append_pair("fields", "id");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "kind": "drive#permission",
                "type": "anyone",
                "role": role,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn resize_grid(
        &self,
        id: &SpreadsheetId,
        sheet_id: i64,
        rows: usize,
        columns: usize,
    ) -> Result<()> {
        let url = self.sheets_url(&["spreadsheets", &format!("{id}:batchUpdate")])?;
        let body = json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": {
                            "rowCount": rows,
                            "columnCount": columns,
                        }
                    },
                    "fields": "gridProperties",
                }
            }]
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_values(
        &self,
        id: &SpreadsheetId,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<()> {
        let mut url = self.sheets_url(&["spreadsheets", id.as_str(), "values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        trace!("PUT {} ({} rows)", url, values.len());

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
