use crate::domain::model::TabRef;
use crate::domain::ports::{ConfigProvider, SpreadsheetService};
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Sheets v4 REST 客戶端：`batchUpdate/addSheet` 建立分頁，`values.update` 寫入資料
pub struct HttpSheetsClient {
    client: Client,
    endpoint: Url,
    spreadsheet_id: String,
    access_token: String,
}

impl HttpSheetsClient {
    pub fn new<C: ConfigProvider>(config: &C, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(config.sheets_endpoint()).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: "sheets.endpoint".to_string(),
                value: config.sheets_endpoint().to_string(),
                reason: format!("Invalid URL format: {}", e),
            }
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            spreadsheet_id: config.spreadsheet_id().to_string(),
            access_token: config.access_token().to_string(),
        })
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| EtlError::ConfigError {
                message: format!("sheets.endpoint cannot be a base URL: {}", self.endpoint),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn ensure_success(response: Response) -> Result<()> {
        let status = response.status();
        tracing::debug!("Sheets API response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EtlError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl SpreadsheetService for HttpSheetsClient {
    async fn create_tab(&self, title: &str) -> Result<TabRef> {
        let batch_update = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url_for(&["v4", "spreadsheets", &batch_update])?;
        let body = serde_json::json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });

        tracing::debug!("Creating sheet tab '{}'", title);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        Ok(TabRef {
            spreadsheet_id: self.spreadsheet_id.clone(),
            title: title.to_string(),
        })
    }

    async fn write_values(&self, tab: &TabRef, values: Vec<Vec<String>>) -> Result<()> {
        let range = tab.anchor_range();
        let url = self.url_for(&["v4", "spreadsheets", &tab.spreadsheet_id, "values", &range])?;
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });

        tracing::debug!("Writing {} rows to '{}'", values.len(), tab.title);
        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        Ok(())
    }
}
