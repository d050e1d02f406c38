use crate::core::pipeline::VerificationPipeline;
use crate::core::reader::read_rows;
use crate::core::writer::DestinationWriter;
use crate::domain::model::{AnnotatedRow, CreditBalance, RunResult, UploadRef};
use crate::domain::ports::{ConfigProvider, SpreadsheetService, Storage, VerificationService};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};

/// 一次請求的完整流程：讀取、驗證、寫入、清除上傳檔
pub struct RunOrchestrator<'a, St, V, S>
where
    St: Storage,
    V: VerificationService,
    S: SpreadsheetService,
{
    storage: &'a St,
    verifier: &'a V,
    sheets: &'a S,
    email_column: String,
    delimiter: u8,
}

impl<'a, St, V, S> RunOrchestrator<'a, St, V, S>
where
    St: Storage,
    V: VerificationService,
    S: SpreadsheetService,
{
    pub fn new<C: ConfigProvider>(
        storage: &'a St,
        verifier: &'a V,
        sheets: &'a S,
        config: &C,
    ) -> Self {
        Self {
            storage,
            verifier,
            sheets,
            email_column: config.email_column().to_string(),
            delimiter: config.delimiter(),
        }
    }

    pub async fn run(&self, upload: &UploadRef) -> Result<RunResult> {
        self.run_at(upload, Utc::now()).await
    }

    /// 以指定的開始時間執行；分頁名稱只由這個時間決定。
    /// 不論成功或在哪個階段失敗，上傳檔都會在回傳前刪除一次。
    pub async fn run_at(&self, upload: &UploadRef, started_at: DateTime<Utc>) -> Result<RunResult> {
        tracing::info!("🚀 Starting run for '{}'", upload.file_name);

        let outcome = self.verify_and_persist(upload, started_at).await;
        self.release(upload).await;

        match &outcome {
            Ok(result) => tracing::info!(
                "✅ Run finished: {} rows written to '{}' {:?}",
                result.rows.len(),
                result.destination_name.as_deref().unwrap_or_default(),
                result.summary()
            ),
            Err(e) => tracing::error!(
                "❌ Run failed at stage {}: {}",
                e.stage().map(|s| s.as_str()).unwrap_or("unknown"),
                e
            ),
        }

        outcome
    }

    /// 重新驗證已存在的上傳檔，不寫入也不刪除
    pub async fn read_back(&self, file_name: &str) -> Result<RunResult> {
        if !self.storage.exists(file_name).await? {
            return Err(EtlError::InputNotFound {
                name: file_name.to_string(),
            });
        }

        tracing::info!("🔁 Read-back of '{}'", file_name);
        let rows = self.verify_file(file_name).await?;

        Ok(RunResult {
            destination_name: None,
            created_at: Utc::now(),
            rows,
        })
    }

    pub async fn credits(&self) -> CreditBalance {
        self.verifier.check_balance().await
    }

    async fn verify_and_persist(
        &self,
        upload: &UploadRef,
        started_at: DateTime<Utc>,
    ) -> Result<RunResult> {
        let rows = self.verify_file(&upload.file_name).await?;

        let destination = DestinationWriter::new(self.sheets)
            .persist(&rows, started_at)
            .await?;

        Ok(RunResult {
            destination_name: Some(destination.tab.title),
            created_at: started_at,
            rows,
        })
    }

    /// 整份輸入解析成功後才開始驗證
    async fn verify_file(&self, file_name: &str) -> Result<Vec<AnnotatedRow>> {
        let data = self.storage.read_file(file_name).await?;
        let rows = read_rows(&data, self.delimiter)?;
        tracing::info!("📥 Read {} rows from '{}'", rows.len(), file_name);

        let pipeline = VerificationPipeline::new(self.verifier, self.email_column.clone());
        Ok(pipeline.run(rows).await)
    }

    async fn release(&self, upload: &UploadRef) {
        match self.storage.delete_file(&upload.file_name).await {
            Ok(()) => tracing::debug!("Removed upload '{}'", upload.file_name),
            Err(e) => tracing::warn!("Failed to remove upload '{}': {}", upload.file_name, e),
        }
    }
}
