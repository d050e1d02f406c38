use crate::domain::model::{AnnotatedRow, DestinationRef};
use crate::domain::ports::SpreadsheetService;
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// 由執行開始時間產生分頁名稱，冒號與小數點換成 `-`
pub fn tab_name_for(started_at: DateTime<Utc>) -> String {
    started_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// 第一列的欄位當標題，其餘列依標題投影，缺少的欄位寫空字串
pub fn build_values(rows: &[AnnotatedRow]) -> Vec<Vec<String>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let header: Vec<String> = first.columns().into_iter().map(str::to_string).collect();
    let mut values = Vec::with_capacity(rows.len() + 1);
    for row in rows {
        values.push(
            header
                .iter()
                .map(|column| row.cell(column).unwrap_or_default())
                .collect(),
        );
    }
    values.insert(0, header);
    values
}

/// 建立新分頁後寫入資料。兩步之間沒有交易：寫入失敗時分頁仍會留著。
pub struct DestinationWriter<'a, S: SpreadsheetService> {
    sheets: &'a S,
}

impl<'a, S: SpreadsheetService> DestinationWriter<'a, S> {
    pub fn new(sheets: &'a S) -> Self {
        Self { sheets }
    }

    pub async fn persist(
        &self,
        rows: &[AnnotatedRow],
        started_at: DateTime<Utc>,
    ) -> Result<DestinationRef> {
        let name = tab_name_for(started_at);

        tracing::info!("📄 Creating sheet tab '{}'", name);
        let tab = self.sheets.create_tab(&name).await.map_err(|e| {
            EtlError::DestinationCreateError {
                tab: name.clone(),
                message: e.to_string(),
            }
        })?;

        if rows.is_empty() {
            tracing::info!("No rows to write to '{}'", tab.title);
            return Ok(DestinationRef {
                tab,
                rows_written: 0,
            });
        }

        let values = build_values(rows);
        tracing::info!("📝 Writing {} rows to '{}'", rows.len(), tab.title);
        self.sheets
            .write_values(&tab, values)
            .await
            .map_err(|e| EtlError::DestinationWriteError {
                tab: tab.title.clone(),
                message: e.to_string(),
            })?;

        Ok(DestinationRef {
            tab,
            rows_written: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Row, TabRef, VerificationOutcome, VerificationStatus};
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSheets {
        fail_create: bool,
        fail_write: bool,
        created: Mutex<Vec<String>>,
        written: Mutex<Vec<Vec<Vec<String>>>>,
    }

    #[async_trait::async_trait]
    impl SpreadsheetService for FakeSheets {
        async fn create_tab(&self, title: &str) -> Result<TabRef> {
            if self.fail_create {
                return Err(EtlError::ServiceError {
                    status: 403,
                    message: "forbidden".to_string(),
                });
            }
            self.created.lock().unwrap().push(title.to_string());
            Ok(TabRef {
                spreadsheet_id: "sheet".to_string(),
                title: title.to_string(),
            })
        }

        async fn write_values(&self, _tab: &TabRef, values: Vec<Vec<String>>) -> Result<()> {
            if self.fail_write {
                return Err(EtlError::ServiceError {
                    status: 500,
                    message: "backend".to_string(),
                });
            }
            self.written.lock().unwrap().push(values);
            Ok(())
        }
    }

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 7, 15, 30).unwrap()
    }

    fn annotated(cells: &[(&str, &str)], status: &str) -> AnnotatedRow {
        AnnotatedRow::new(
            cells.iter().copied().collect::<Row>(),
            VerificationOutcome {
                address: String::new(),
                status: VerificationStatus::from(status),
                quality_score: None,
                raw_detail: serde_json::json!({"result": status}),
            },
        )
    }

    #[test]
    fn test_tab_name_is_sheet_safe_and_deterministic() {
        let name = tab_name_for(started_at());

        assert_eq!(name, "2026-10-19T07-15-30-000Z");
        assert_eq!(name, tab_name_for(started_at()));
        assert!(!name.contains(':') && !name.contains('.'));
        assert_ne!(name, tab_name_for(started_at() + chrono::Duration::seconds(2)));
    }

    #[test]
    fn test_build_values_projects_onto_first_row_header() {
        let rows = vec![
            annotated(&[("email", "a@x.com"), ("name", "amy")], "valid"),
            annotated(&[("email", "b@x.com")], "invalid"),
        ];

        let values = build_values(&rows);

        assert_eq!(
            values[0],
            vec!["email", "name", "verification", "verificationDetails"]
        );
        assert_eq!(
            values[1],
            vec!["a@x.com", "amy", "valid", r#"{"result":"valid"}"#]
        );
        assert_eq!(
            values[2],
            vec!["b@x.com", "", "invalid", r#"{"result":"invalid"}"#]
        );
    }

    #[test]
    fn test_build_values_replaces_input_verification_column() {
        let rows = vec![annotated(
            &[("email", "a@x.com"), ("verification", "old")],
            "valid",
        )];

        let values = build_values(&rows);

        assert_eq!(values[0], vec!["email", "verification", "verificationDetails"]);
        assert_eq!(values[1], vec!["a@x.com", "valid", r#"{"result":"valid"}"#]);
    }

    #[tokio::test]
    async fn test_persist_creates_tab_then_writes_block() {
        let sheets = FakeSheets::default();
        let writer = DestinationWriter::new(&sheets);
        let rows = vec![annotated(&[("email", "a@x.com")], "valid")];

        let destination = writer.persist(&rows, started_at()).await.unwrap();

        assert_eq!(destination.tab.title, "2026-10-19T07-15-30-000Z");
        assert_eq!(destination.rows_written, 1);
        assert_eq!(sheets.created.lock().unwrap().len(), 1);
        assert_eq!(sheets.written.lock().unwrap()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_empty_aggregate_creates_tab_without_write() {
        let sheets = FakeSheets::default();
        let writer = DestinationWriter::new(&sheets);

        let destination = writer.persist(&[], started_at()).await.unwrap();

        assert_eq!(destination.rows_written, 0);
        assert_eq!(sheets.created.lock().unwrap().len(), 1);
        assert!(sheets.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_skips_write() {
        let sheets = FakeSheets {
            fail_create: true,
            ..Default::default()
        };
        let writer = DestinationWriter::new(&sheets);
        let rows = vec![annotated(&[("email", "a@x.com")], "valid")];

        let err = writer.persist(&rows, started_at()).await.unwrap_err();

        assert!(matches!(err, EtlError::DestinationCreateError { .. }));
        assert!(err.to_string().contains("forbidden"));
        assert!(sheets.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_leaves_created_tab() {
        let sheets = FakeSheets {
            fail_write: true,
            ..Default::default()
        };
        let writer = DestinationWriter::new(&sheets);
        let rows = vec![annotated(&[("email", "a@x.com")], "valid")];

        let err = writer.persist(&rows, started_at()).await.unwrap_err();

        assert!(matches!(err, EtlError::DestinationWriteError { .. }));
        assert_eq!(sheets.created.lock().unwrap().len(), 1);
    }
}
