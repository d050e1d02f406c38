use crate::domain::model::{AnnotatedRow, Row, VerificationOutcome};
use crate::domain::ports::VerificationService;

pub const MISSING_EMAIL_DETAIL: &str = "missing email field";

/// 依序驗證每一列並附上結果。單列失敗只會記錄在該列，不會中斷整批。
pub struct VerificationPipeline<'a, V: VerificationService> {
    verifier: &'a V,
    email_column: String,
}

impl<'a, V: VerificationService> VerificationPipeline<'a, V> {
    pub fn new(verifier: &'a V, email_column: impl Into<String>) -> Self {
        Self {
            verifier,
            email_column: email_column.into(),
        }
    }

    /// 一次只發出一個驗證請求，輸出順序與輸入相同
    pub async fn run(&self, rows: Vec<Row>) -> Vec<AnnotatedRow> {
        let total = rows.len();
        tracing::info!("🔎 Verifying {} rows", total);

        let mut annotated = Vec::with_capacity(total);
        for (index, row) in rows.into_iter().enumerate() {
            let outcome = self.verify_row(index, &row).await;
            annotated.push(AnnotatedRow::new(row, outcome));
        }

        tracing::info!("✅ Verified {} rows", annotated.len());
        annotated
    }

    async fn verify_row(&self, index: usize, row: &Row) -> VerificationOutcome {
        let address = row
            .get(&self.email_column)
            .map(str::trim)
            .filter(|address| !address.is_empty());

        match address {
            Some(address) => self.verifier.verify(address).await,
            None => {
                tracing::warn!("Row {} has no '{}' value, skipping", index + 1, self.email_column);
                VerificationOutcome::fault("", MISSING_EMAIL_DETAIL)
            }
        }
    }
}
