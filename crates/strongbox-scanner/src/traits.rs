//! Capability trait for the scan gate.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::ScanOutcome;

/// Abstract scanning capability consumed by the upload pipeline.
///
/// Implementations must be fail-closed: any inability to obtain a definitive
/// verdict yields an outcome with `completed == false`, never a panic and
/// never an implicit "clean".
#[async_trait]
pub trait VirusScanner: Send + Sync {
    /// Liveness probe. Returns false on any deviation from the expected
    /// reply, including refusal and timeout.
    async fn ping(&self) -> bool;

    /// Scan a byte buffer. Cancelling `cancel` aborts an in-flight socket
    /// operation and surfaces as an incomplete outcome.
    async fn scan(&self, data: &[u8], cancel: &CancellationToken) -> ScanOutcome;
}
