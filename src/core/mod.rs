pub mod orchestrator;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use crate::domain::model::{AnnotatedRow, Row, RunResult};
pub use crate::domain::ports::{ConfigProvider, SpreadsheetService, Storage, VerificationService};
pub use crate::utils::error::Result;
