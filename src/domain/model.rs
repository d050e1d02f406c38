use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 驗證結果欄位名稱
pub const VERIFICATION_COLUMN: &str = "verification";
/// 驗證細節欄位名稱
pub const VERIFICATION_DETAILS_COLUMN: &str = "verificationDetails";

/// 表格輸入中的一列，保留標題列的欄位順序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依欄位順序加入一格；同名欄位會覆蓋舊值
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// 驗證服務回傳的分類。已知分類之外的值原樣保留在 `Other`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VerificationStatus {
    Valid,
    Invalid,
    Unknown,
    Error,
    Other(String),
}

impl VerificationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VerificationStatus::Valid => "valid",
            VerificationStatus::Invalid => "invalid",
            VerificationStatus::Unknown => "unknown",
            VerificationStatus::Error => "error",
            VerificationStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for VerificationStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "valid" => VerificationStatus::Valid,
            "invalid" => VerificationStatus::Invalid,
            "unknown" => VerificationStatus::Unknown,
            "error" => VerificationStatus::Error,
            _ => VerificationStatus::Other(raw),
        }
    }
}

impl From<&str> for VerificationStatus {
    fn from(raw: &str) -> Self {
        VerificationStatus::from(raw.to_string())
    }
}

impl From<VerificationStatus> for String {
    fn from(status: VerificationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單一地址的驗證結果，建立後不再變動
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub address: String,
    pub status: VerificationStatus,
    pub quality_score: Option<f64>,
    pub raw_detail: serde_json::Value,
}

impl VerificationOutcome {
    /// 把傳輸或服務錯誤收斂成 `error` 狀態
    pub fn fault(address: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: VerificationStatus::Error,
            quality_score: None,
            raw_detail: serde_json::Value::String(detail.into()),
        }
    }
}

/// 原始列加上驗證狀態與細節
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    pub row: Row,
    pub verification: VerificationStatus,
    pub verification_details: serde_json::Value,
}

impl AnnotatedRow {
    pub fn new(row: Row, outcome: VerificationOutcome) -> Self {
        Self {
            row,
            verification: outcome.status,
            verification_details: outcome.raw_detail,
        }
    }

    /// 原始欄位之後接上兩個驗證欄位。輸入中同名的欄位會被驗證結果取代。
    pub fn columns(&self) -> Vec<&str> {
        self.input_cells()
            .map(|(name, _)| name.as_str())
            .chain([VERIFICATION_COLUMN, VERIFICATION_DETAILS_COLUMN])
            .collect()
    }

    fn input_cells(&self) -> impl Iterator<Item = &(String, String)> {
        self.row
            .cells()
            .iter()
            .filter(|(name, _)| !is_verification_column(name))
    }

    /// 取得扁平化後的儲存格文字；驗證細節在這裡才轉成字串
    pub fn cell(&self, column: &str) -> Option<String> {
        match column {
            VERIFICATION_COLUMN => Some(self.verification.to_string()),
            VERIFICATION_DETAILS_COLUMN => Some(flatten_detail(&self.verification_details)),
            _ => self.row.get(column).map(str::to_string),
        }
    }
}

impl Serialize for AnnotatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (column, value) in self.input_cells() {
            map.serialize_entry(column, value)?;
        }
        map.serialize_entry(VERIFICATION_COLUMN, &self.verification)?;
        map.serialize_entry(VERIFICATION_DETAILS_COLUMN, &self.verification_details)?;
        map.end()
    }
}

fn is_verification_column(name: &str) -> bool {
    name == VERIFICATION_COLUMN || name == VERIFICATION_DETAILS_COLUMN
}

/// 字串細節直接輸出，其餘以 JSON 表示
pub fn flatten_detail(detail: &serde_json::Value) -> String {
    match detail {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 一次執行的完整輸出
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub destination_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub rows: Vec<AnnotatedRow>,
}

impl RunResult {
    /// 依狀態統計列數
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.verification.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditBalance {
    pub credits: Option<i64>,
    pub detail: serde_json::Value,
}

/// 目的地試算表中新建立的分頁
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRef {
    pub spreadsheet_id: String,
    pub title: String,
}

impl TabRef {
    /// 以新分頁左上角為錨點的 A1 範圍
    pub fn anchor_range(&self) -> String {
        format!("'{}'!A1", self.title.replace('\'', "''"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRef {
    pub tab: TabRef,
    pub rows_written: usize,
}

/// 上傳後暫存在本地儲存區的檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRef {
    pub file_name: String,
}

impl UploadRef {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

/// 終止性失敗發生的階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Read,
    Sheet,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Sheet => "sheet",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keeps_header_order() {
        let row: Row = [("name", "bob"), ("email", "b@x.com"), ("age", "3")]
            .into_iter()
            .collect();

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["name", "email", "age"]);
        assert_eq!(row.get("email"), Some("b@x.com"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_status_passes_unknown_categories_through() {
        assert_eq!(VerificationStatus::from("valid"), VerificationStatus::Valid);
        assert_eq!(
            VerificationStatus::from("catch_all"),
            VerificationStatus::Other("catch_all".to_string())
        );
        assert_eq!(VerificationStatus::from("catch_all").as_str(), "catch_all");
    }

    #[test]
    fn test_annotated_row_serializes_flat_in_column_order() {
        let row: Row = [("email", "a@x.com"), ("name", "amy")].into_iter().collect();
        let annotated = AnnotatedRow::new(
            row,
            VerificationOutcome {
                address: "a@x.com".to_string(),
                status: VerificationStatus::Valid,
                quality_score: Some(0.9),
                raw_detail: serde_json::json!({"result": "valid"}),
            },
        );

        let json = serde_json::to_string(&annotated).unwrap();
        assert_eq!(
            json,
            r#"{"email":"a@x.com","name":"amy","verification":"valid","verificationDetails":{"result":"valid"}}"#
        );
        assert_eq!(
            annotated.columns(),
            vec!["email", "name", "verification", "verificationDetails"]
        );
    }

    #[test]
    fn test_existing_verification_columns_are_replaced() {
        let row: Row = [
            ("email", "a@x.com"),
            ("verification", "old"),
            ("verificationDetails", "stale"),
        ]
        .into_iter()
        .collect();
        let annotated = AnnotatedRow::new(
            row,
            VerificationOutcome {
                address: "a@x.com".to_string(),
                status: VerificationStatus::Valid,
                quality_score: None,
                raw_detail: serde_json::json!({"result": "valid"}),
            },
        );

        assert_eq!(
            annotated.columns(),
            vec!["email", "verification", "verificationDetails"]
        );
        assert_eq!(
            serde_json::to_string(&annotated).unwrap(),
            r#"{"email":"a@x.com","verification":"valid","verificationDetails":{"result":"valid"}}"#
        );
    }

    #[test]
    fn test_cell_flattens_details_only_at_projection() {
        let annotated = AnnotatedRow::new(Row::new(), VerificationOutcome::fault("", "boom"));
        assert_eq!(annotated.cell(VERIFICATION_DETAILS_COLUMN).unwrap(), "boom");
        assert_eq!(annotated.verification_details, serde_json::json!("boom"));

        let structured = AnnotatedRow::new(
            Row::new(),
            VerificationOutcome {
                address: "a@x.com".to_string(),
                status: VerificationStatus::Valid,
                quality_score: None,
                raw_detail: serde_json::json!({"result": "valid"}),
            },
        );
        assert_eq!(
            structured.cell(VERIFICATION_DETAILS_COLUMN).unwrap(),
            r#"{"result":"valid"}"#
        );
    }

    #[test]
    fn test_anchor_range_quotes_title() {
        let tab = TabRef {
            spreadsheet_id: "sheet".to_string(),
            title: "2026-10-19T07-15-00-000Z".to_string(),
        };
        assert_eq!(tab.anchor_range(), "'2026-10-19T07-15-00-000Z'!A1");
    }

    #[test]
    fn test_summary_counts_by_status() {
        let rows = vec![
            AnnotatedRow::new(Row::new(), VerificationOutcome::fault("a", "x")),
            AnnotatedRow::new(Row::new(), VerificationOutcome::fault("b", "y")),
        ];
        let result = RunResult {
            destination_name: None,
            created_at: Utc::now(),
            rows,
        };
        assert_eq!(result.summary().get("error"), Some(&2));
    }
}
