//! Scan-gated file service
//!
//! Orchestrates the upload pipeline (validate → scan → persist) and exposes
//! the narrow interface other modules consume: upload, fetch, download,
//! delete. The scanner and both halves of the storage gateway are reached
//! through trait objects so tests substitute in-memory fakes.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use strongbox_core::config::UploadConfig;
use strongbox_core::models::StoredFile;
use strongbox_core::validation;
use strongbox_core::AppError;
use strongbox_db::FileMetadataStore;
use strongbox_scanner::{ScanOutcome, VirusScanner};
use strongbox_storage::{keys, Storage, StorageError};

use super::types::{BatchUploadResult, FileDownload, UploadRequest, UploadResult};

/// File upload service enforcing the scan gate.
///
/// Ordering guarantee per request: validation strictly precedes scanning,
/// which strictly precedes persistence. A metadata record is created only
/// after the bytes passed a scan and were durably written; no step is ever
/// skipped or reordered.
pub struct FileService {
    scanner: Arc<dyn VirusScanner>,
    storage: Arc<dyn Storage>,
    metadata: Arc<dyn FileMetadataStore>,
    config: UploadConfig,
}

impl FileService {
    pub fn new(
        scanner: Arc<dyn VirusScanner>,
        storage: Arc<dyn Storage>,
        metadata: Arc<dyn FileMetadataStore>,
        config: UploadConfig,
    ) -> Self {
        Self {
            scanner,
            storage,
            metadata,
            config,
        }
    }

    /// Probe the scanner daemon. Useful for readiness checks.
    pub async fn scanner_healthy(&self) -> bool {
        self.scanner.ping().await
    }

    /// Validate a request without performing any I/O. Returns the lowercased
    /// extension and the sanitized original filename.
    fn validate(&self, request: &UploadRequest) -> Result<(String, String), AppError> {
        validation::validate_file_size(request.data.len(), self.config.max_file_size_bytes)?;
        let extension = validation::validate_file_extension(
            &request.original_filename,
            &self.config.allowed_extensions,
        )?;
        let safe_name = validation::sanitize_filename(&request.original_filename)?;
        Ok((extension, safe_name))
    }

    /// Run one file through the pipeline: validate → scan → persist.
    ///
    /// Every rejection (validation, unreachable scanner, detection, storage
    /// failure) is a normal outcome carrying a specific reason; content that
    /// was not scanned clean is never persisted.
    pub async fn upload_one(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> UploadResult {
        let (extension, safe_name) = match self.validate(&request) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::debug!(
                    filename = %request.original_filename,
                    reason = %e,
                    "Upload rejected by validation"
                );
                return UploadResult::rejected(e.to_string(), ScanOutcome::skipped());
            }
        };

        if cancel.is_cancelled() {
            return UploadResult::rejected(
                "Upload cancelled before scanning",
                ScanOutcome::skipped(),
            );
        }

        let outcome = self.scanner.scan(&request.data, cancel).await;

        // The core security contract: an ambiguous outcome is treated as
        // unsafe. Unscanned content must never reach storage.
        if !outcome.completed {
            tracing::warn!(
                filename = %request.original_filename,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Rejecting upload: virus scan unreachable or failed"
            );
            return UploadResult::rejected(
                "Virus scan unreachable or failed; upload rejected",
                outcome,
            );
        }

        if !outcome.clean {
            let threat = outcome
                .threat_name
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            tracing::warn!(
                filename = %request.original_filename,
                threat = %threat,
                "Rejecting upload: virus detected"
            );
            return UploadResult::rejected(format!("Virus detected ({})", threat), outcome);
        }

        if cancel.is_cancelled() {
            return UploadResult::rejected("Upload cancelled before persisting", outcome);
        }

        self.persist(request, extension, safe_name, outcome).await
    }

    /// Write bytes and create the metadata record for a file that scanned
    /// clean. The stored name is drawn from a fresh UUID, never from the
    /// caller-supplied filename.
    async fn persist(
        &self,
        request: UploadRequest,
        extension: String,
        safe_name: String,
        outcome: ScanOutcome,
    ) -> UploadResult {
        let file_id = Uuid::new_v4();
        let stored_name = format!("{}.{}", file_id, extension);
        let size = request.data.len();

        tracing::info!(
            file_id = %file_id,
            original_filename = %safe_name,
            size_bytes = size,
            "Persisting scanned upload"
        );

        let key = match self
            .storage
            .upload(
                request.owner_id,
                &stored_name,
                &request.content_type,
                request.data,
            )
            .await
        {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    file_id = %file_id,
                    "Storage write failed after clean scan"
                );
                return UploadResult::rejected(format!("Storage write failed: {}", e), outcome);
            }
        };

        let record = StoredFile {
            id: file_id,
            stored_name: stored_name.clone(),
            original_name: safe_name,
            size: size as i64,
            content_type: request.content_type,
            owner_id: request.owner_id,
            scan_summary: outcome.summary(),
            uploaded_at: Utc::now(),
        };

        if let Err(e) = self.metadata.insert(&record).await {
            // The written bytes are left in place; reconciliation of orphaned
            // files happens out of band. No record exists, so the upload is
            // reported rejected and the caller must resubmit.
            tracing::error!(
                error = %e,
                file_id = %file_id,
                key = %key,
                "Metadata insert failed after storage write; bytes are orphaned"
            );
            return UploadResult::rejected(
                format!("Failed to record file metadata: {}", e),
                outcome,
            );
        }

        tracing::info!(
            file_id = %file_id,
            stored_name = %stored_name,
            "Upload committed"
        );

        UploadResult::accepted(stored_name, outcome)
    }

    /// Upload a batch of files. Files are processed independently; one
    /// rejection does not abort the rest.
    pub async fn upload_many(
        &self,
        requests: Vec<UploadRequest>,
        cancel: &CancellationToken,
    ) -> BatchUploadResult {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.upload_one(request, cancel).await);
        }

        let success_count = results.iter().filter(|r| r.accepted).count();
        let failure_count = results.len() - success_count;
        BatchUploadResult {
            results,
            success_count,
            failure_count,
        }
    }

    /// Fetch a file's metadata record.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, AppError> {
        self.metadata.get_by_id(id).await
    }

    /// List an owner's files, newest first.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<StoredFile>, AppError> {
        self.metadata.list_for_owner(owner_id).await
    }

    /// Count an owner's files.
    pub async fn count_for_owner(&self, owner_id: Uuid) -> Result<i64, AppError> {
        self.metadata.count_for_owner(owner_id).await
    }

    /// Open a file for download as a byte stream.
    pub async fn download(&self, id: Uuid) -> Result<Option<FileDownload>, AppError> {
        let Some(record) = self.metadata.get_by_id(id).await? else {
            return Ok(None);
        };

        let key = keys::file_key(record.owner_id, &record.stored_name);
        let stream = match self.storage.download_stream(&key).await {
            Ok(stream) => stream,
            Err(StorageError::NotFound(_)) => {
                tracing::error!(file_id = %id, key = %key, "Metadata present but bytes missing");
                return Ok(None);
            }
            Err(e) => return Err(AppError::Storage(e.to_string())),
        };

        Ok(Some(FileDownload {
            stream,
            content_type: record.content_type,
            original_name: record.original_name,
            size: record.size,
        }))
    }

    /// Delete a file. Permitted only for the record's owner or a privileged
    /// actor; checked before any mutation.
    ///
    /// Bytes are removed before the metadata record: if byte removal fails
    /// the record stays so the failure remains visible. If the metadata
    /// delete fails after byte removal the stale record is logged and the
    /// error surfaced; reconciliation happens out of band.
    pub async fn delete(
        &self,
        id: Uuid,
        actor_id: Uuid,
        is_privileged: bool,
    ) -> Result<bool, AppError> {
        let Some(record) = self.metadata.get_by_id(id).await? else {
            return Ok(false);
        };

        if record.owner_id != actor_id && !is_privileged {
            tracing::warn!(
                file_id = %id,
                actor_id = %actor_id,
                "Unauthorized delete attempt"
            );
            return Err(AppError::Unauthorized(
                "Only the file owner or a privileged actor may delete a file".to_string(),
            ));
        }

        let key = keys::file_key(record.owner_id, &record.stored_name);
        self.storage
            .delete(&key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        match self.metadata.delete(id).await {
            Ok(removed) => {
                tracing::info!(file_id = %id, actor_id = %actor_id, "File deleted");
                Ok(removed)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file_id = %id,
                    "Bytes removed but metadata delete failed; stale record remains"
                );
                Err(e)
            }
        }
    }
}
