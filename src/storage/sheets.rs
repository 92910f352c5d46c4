//! Google Sheets REST client
//!
//! Speaks the `spreadsheets.values` endpoints of the Sheets v4 API with a
//! bearer token. Obtaining and refreshing that token is left to the
//! operator's tooling; the client only reads it from the environment.

use crate::config::SheetsApiConfig;
use crate::storage::traits::{DocumentStore, Grid, StoreError, StoreResult};
use crate::storage::{CellRef, CellWrite, RangeSpec};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Document store backed by one Google spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    /// Creates a client using the token named by `config.access_token_env`
    pub fn from_env(config: &SheetsApiConfig, spreadsheet_id: &str) -> StoreResult<Self> {
        let token = std::env::var(&config.access_token_env).map_err(|_| {
            StoreError::Unavailable(format!(
                "environment variable {} holds no access token",
                config.access_token_env
            ))
        })?;
        Self::new(&config.base_url, spreadsheet_id, &token)
    }

    /// Creates a client for the given API base URL and token
    pub fn new(base_url: &str, spreadsheet_id: &str, access_token: &str) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid API base URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// Builds `<base>/spreadsheets/<id>/<segments...>` with each segment escaped
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            code: status.as_u16(),
            body,
        })
    }

    /// Lists the titles of every sheet in the spreadsheet, in tab order
    pub async fn list_sheets(&self) -> StoreResult<Vec<String>> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for SheetsClient {
    async fn read_range(&self, range: &RangeSpec) -> StoreResult<Grid> {
        let url = self.endpoint(&["values", &range.to_a1()])?;
        tracing::debug!("Reading range {}", range);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body: ValueRange = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(value_to_string).collect())
            .collect())
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> StoreResult<()> {
        let a1 = cell.to_a1();
        let mut url = self.endpoint(&["values", &a1])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "range": a1, "values": [[value]] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn batch_write(&self, writes: &[CellWrite]) -> StoreResult<()> {
        let url = self.endpoint(&["values:batchUpdate"])?;
        let data: Vec<Value> = writes
            .iter()
            .map(|w| json!({ "range": w.cell.to_a1(), "values": [[w.value]] }))
            .collect();

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "valueInputOption": "RAW", "data": data }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
