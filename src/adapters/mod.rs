// Adapters layer: concrete implementations for external systems (upload storage, verification service, spreadsheet).

pub mod sheets;
pub mod storage;
pub mod verifier;

pub use sheets::HttpSheetsClient;
pub use storage::LocalStorage;
pub use verifier::HttpVerificationClient;
