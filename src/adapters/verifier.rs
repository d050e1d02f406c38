use crate::domain::model::{CreditBalance, VerificationOutcome, VerificationStatus};
use crate::domain::ports::{ConfigProvider, VerificationService};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::time::Duration;

/// 郵件驗證服務的 HTTP 客戶端
pub struct HttpVerificationClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpVerificationClient {
    pub fn new<C: ConfigProvider>(config: &C, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.verifier_endpoint().trim_end_matches('/').to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    /// 發送 GET 並解析 JSON；非 2xx 轉成 ServiceError。
    /// URL 帶有 API key，所以錯誤訊息裡不保留 URL。
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .query(&[("api", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))?;

        let status = response.status();
        tracing::debug!("Verification service response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EtlError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))
    }

    async fn try_check_balance(&self) -> Result<CreditBalance> {
        let url = format!("{}/credits", self.endpoint);
        let detail = self.get_json(&url, &[]).await?;

        Ok(CreditBalance {
            credits: detail.get("credits").and_then(as_integer),
            detail,
        })
    }

    async fn try_verify(&self, address: &str) -> Result<VerificationOutcome> {
        let url = format!("{}/", self.endpoint);
        let detail = self.get_json(&url, &[("email", address)]).await?;

        let status = detail
            .get("result")
            .and_then(|v| v.as_str())
            .map(VerificationStatus::from)
            .unwrap_or(VerificationStatus::Unknown);

        Ok(VerificationOutcome {
            address: address.to_string(),
            status,
            quality_score: detail.get("quality").and_then(as_number),
            raw_detail: detail,
        })
    }
}

#[async_trait::async_trait]
impl VerificationService for HttpVerificationClient {
    async fn check_balance(&self) -> CreditBalance {
        match self.try_check_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!("Credit check failed: {}", e);
                CreditBalance {
                    credits: None,
                    detail: serde_json::Value::String(e.to_string()),
                }
            }
        }
    }

    async fn verify(&self, address: &str) -> VerificationOutcome {
        tracing::debug!("Verifying address: {}", address);
        match self.try_verify(address).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Verification failed for {}: {}", address, e);
                VerificationOutcome::fault(address, e.to_string())
            }
        }
    }
}

/// 數字或數字字串都接受
fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
