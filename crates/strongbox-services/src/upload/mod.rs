//! Scan-gated upload pipeline
//!
//! Per-request flow: validate → scan → persist. Validation performs no I/O;
//! scanning strictly precedes persistence; any non-clean or incomplete scan
//! outcome rejects the request with nothing persisted.

mod service;
mod types;

pub use service::FileService;
pub use types::{BatchUploadResult, FileDownload, UploadRequest, UploadResult};
