use crate::domain::model::Row;
use crate::utils::error::{EtlError, Result};
use std::io::Read;
use std::sync::Arc;

/// 以第一列為標題，逐列把分隔文字轉成 `Row`。
///
/// 比標題短的列只會有被覆蓋到的欄位；多出來的儲存格會被丟棄。
pub struct TabularReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    headers: Arc<[String]>,
}

impl<R: Read> TabularReader<R> {
    pub fn new(source: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers: Arc<[String]> = reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .map(str::to_string)
            .collect();

        Ok(Self {
            records: reader.into_records(),
            headers,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 讀完整個輸入；任何一列解析失敗都讓整批失敗
    pub fn read_all(self) -> Result<Vec<Row>> {
        self.collect()
    }

    fn to_row(&self, record: &csv::StringRecord) -> Row {
        if record.len() > self.headers.len() {
            tracing::debug!(
                "Dropping {} cells beyond the header on line {}",
                record.len() - self.headers.len(),
                record.position().map(|p| p.line()).unwrap_or(0)
            );
        }

        self.headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect()
    }
}

impl<R: Read> Iterator for TabularReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(parse_error).map(|record| self.to_row(&record)))
    }
}

/// 從記憶體中的位元組讀出全部列
pub fn read_rows(data: &[u8], delimiter: u8) -> Result<Vec<Row>> {
    TabularReader::new(data, delimiter)?.read_all()
}

fn parse_error(err: csv::Error) -> EtlError {
    let message = match err.position() {
        Some(position) => format!("line {}: {}", position.line(), err),
        None => err.to_string(),
    };
    EtlError::ParseError { message }
}
