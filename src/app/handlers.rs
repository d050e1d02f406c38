use crate::core::orchestrator::RunOrchestrator;
use crate::domain::model::UploadRef;
use crate::domain::ports::{SpreadsheetService, Storage, VerificationService};
use crate::utils::error::EtlError;
use serde::Serialize;

/// 與框架無關的回應：狀態碼加 JSON 內容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(&EtlError::SerializationError(e)),
        }
    }

    fn error(err: &EtlError) -> Self {
        let body = serde_json::to_value(err.to_body()).unwrap_or_else(|_| {
            serde_json::json!({ "message": err.user_friendly_message(), "detail": err.to_string() })
        });
        Self {
            status: err.status_code(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 上傳後立即驗證並寫入新分頁
pub async fn handle_upload<St, V, S>(
    orchestrator: &RunOrchestrator<'_, St, V, S>,
    upload: Option<UploadRef>,
) -> ApiResponse
where
    St: Storage,
    V: VerificationService,
    S: SpreadsheetService,
{
    let Some(upload) = upload else {
        return ApiResponse::error(&EtlError::NoInput);
    };

    match orchestrator.run(&upload).await {
        Ok(result) => ApiResponse::ok(&result),
        Err(e) => ApiResponse::error(&e),
    }
}

/// 對已存在的上傳檔重跑讀取與驗證
pub async fn handle_read_back<St, V, S>(
    orchestrator: &RunOrchestrator<'_, St, V, S>,
    file_name: &str,
) -> ApiResponse
where
    St: Storage,
    V: VerificationService,
    S: SpreadsheetService,
{
    match orchestrator.read_back(file_name).await {
        Ok(result) => ApiResponse::ok(&result),
        Err(e) => ApiResponse::error(&e),
    }
}

pub async fn handle_credits<St, V, S>(orchestrator: &RunOrchestrator<'_, St, V, S>) -> ApiResponse
where
    St: Storage,
    V: VerificationService,
    S: SpreadsheetService,
{
    ApiResponse::ok(&orchestrator.credits().await)
}
