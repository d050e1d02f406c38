pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{HttpSheetsClient, HttpVerificationClient, LocalStorage};
pub use config::AppConfig;
pub use crate::core::orchestrator::RunOrchestrator;
pub use domain::model::{AnnotatedRow, CreditBalance, Row, RunResult, UploadRef, VerificationStatus};
pub use utils::error::{EtlError, Result};
