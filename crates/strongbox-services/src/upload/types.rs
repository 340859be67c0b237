//! Request and result types for the upload pipeline.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use uuid::Uuid;

use strongbox_core::AppError;
use strongbox_scanner::ScanOutcome;
use strongbox_storage::StorageError;

/// One file submitted for upload. Immutable once accepted for processing.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
    pub owner_id: Uuid,
}

/// Result of one pipeline invocation.
///
/// `accepted == true` implies the scan completed clean and a durable metadata
/// record now exists.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub accepted: bool,
    pub stored_name: Option<String>,
    pub reason: Option<String>,
    pub outcome: ScanOutcome,
}

impl UploadResult {
    pub(crate) fn accepted(stored_name: String, outcome: ScanOutcome) -> Self {
        UploadResult {
            accepted: true,
            stored_name: Some(stored_name),
            reason: None,
            outcome,
        }
    }

    pub(crate) fn rejected(reason: impl Into<String>, outcome: ScanOutcome) -> Self {
        UploadResult {
            accepted: false,
            stored_name: None,
            reason: Some(reason.into()),
            outcome,
        }
    }

    /// The `AppError` form of a rejection, for host surfaces that present
    /// pipeline rejections through `ErrorMetadata`. `None` for accepted
    /// results.
    pub fn rejection_error(&self) -> Option<AppError> {
        if self.accepted {
            return None;
        }
        let reason = self.reason.clone().unwrap_or_default();
        Some(if let Some(threat) = &self.outcome.threat_name {
            AppError::ThreatDetected(threat.clone())
        } else if let Some(error) = &self.outcome.error {
            AppError::ScanUnavailable(error.clone())
        } else if self.outcome.is_safe() {
            // the scan was clean, so the rejection came from persistence
            AppError::Storage(reason)
        } else {
            AppError::InvalidInput(reason)
        })
    }
}

/// Per-file results of a batch upload plus aggregate counts.
#[derive(Debug, Serialize)]
pub struct BatchUploadResult {
    pub results: Vec<UploadResult>,
    pub success_count: usize,
    pub failure_count: usize,
}

/// A stored file opened for download.
pub struct FileDownload {
    pub stream: Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>,
    pub content_type: String,
    pub original_name: String,
    pub size: i64,
}
