use crate::domain::model::{CreditBalance, TabRef, VerificationOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 上傳檔案所在的暫存區
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn delete_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn verifier_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn sheets_endpoint(&self) -> &str;
    fn spreadsheet_id(&self) -> &str;
    fn access_token(&self) -> &str;
    fn upload_dir(&self) -> &str;
    fn email_column(&self) -> &str;
    fn delimiter(&self) -> u8;
}

/// 遠端郵件驗證服務。兩個操作都不會回傳錯誤，失敗會收斂在結果值裡。
#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn check_balance(&self) -> CreditBalance;
    async fn verify(&self, address: &str) -> VerificationOutcome;
}

/// 試算表服務：建立分頁與寫入儲存格是兩個獨立的呼叫
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    async fn create_tab(&self, title: &str) -> Result<TabRef>;
    async fn write_values(&self, tab: &TabRef, values: Vec<Vec<String>>) -> Result<()>;
}
