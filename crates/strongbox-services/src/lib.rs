//! Strongbox Services Library
//!
//! The scan-gated upload pipeline and the narrow file-service interface
//! consumed by unrelated modules. Files reach durable storage only after an
//! external virus scanner certified them clean; any ambiguity about the scan
//! outcome rejects the upload.

pub mod upload;

// Re-export commonly used types
pub use upload::{
    BatchUploadResult, FileDownload, FileService, UploadRequest, UploadResult,
};
