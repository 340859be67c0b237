//! TCP protocol client for the clamd daemon.

use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use strongbox_core::config::ScannerConfig;

use crate::frame;
use crate::{ScanOutcome, VirusScanner};

/// Maximum bytes accepted in a single daemon reply before giving up.
const MAX_RESPONSE_BYTES: usize = 4096;

/// Client for the clamd stream protocol.
///
/// Every `ping`/`scan` call opens its own connection and closes it before
/// returning, on every branch. The client holds no shared mutable state and
/// is safe to invoke from concurrent callers. There are no retries; retry
/// policy, if desired, belongs to the caller.
#[derive(Clone)]
pub struct ClamdClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ClamdClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        ClamdClient {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        ClamdClient::new(
            config.host.clone(),
            config.port,
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Bound one socket operation by the configured timeout and the caller's
    /// cancellation signal.
    async fn bounded<T, F>(
        &self,
        cancel: &CancellationToken,
        op: &'static str,
        fut: F,
    ) -> io::Result<T>
    where
        F: Future<Output = io::Result<T>>,
    {
        tokio::select! {
            _ = cancel.cancelled() => Err(io::Error::new(
                io::ErrorKind::Interrupted,
                format!("{} aborted by caller", op),
            )),
            result = timeout(self.timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("{} timed out after {:?}", op, self.timeout),
                )),
            },
        }
    }

    async fn connect(&self, cancel: &CancellationToken) -> io::Result<TcpStream> {
        let address = format!("{}:{}", self.host, self.port);
        self.bounded(cancel, "connect", TcpStream::connect(address))
            .await
    }

    /// Read one reply. The daemon terminates its reply with a NUL and closes
    /// the session afterwards, so read until either is seen.
    async fn read_response(
        &self,
        stream: &mut TcpStream,
        cancel: &CancellationToken,
    ) -> io::Result<Vec<u8>> {
        let mut reply = Vec::with_capacity(128);
        let mut buf = [0u8; 256];
        loop {
            let n = self.bounded(cancel, "read", stream.read(&mut buf)).await?;
            if n == 0 {
                break;
            }
            reply.extend_from_slice(&buf[..n]);
            if reply.contains(&0) {
                break;
            }
            if reply.len() > MAX_RESPONSE_BYTES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "daemon reply exceeded response limit",
                ));
            }
        }
        Ok(reply)
    }

    /// Probe the daemon. True only for an exact `PONG` reply; wrong text,
    /// refusal, and timeout all return false.
    pub async fn ping(&self) -> bool {
        match self.ping_inner().await {
            Ok(alive) => alive,
            Err(e) => {
                tracing::debug!(
                    host = %self.host,
                    port = self.port,
                    error = %e,
                    "clamd ping failed"
                );
                false
            }
        }
    }

    async fn ping_inner(&self) -> io::Result<bool> {
        let cancel = CancellationToken::new();
        let mut stream = self.connect(&cancel).await?;
        self.bounded(
            &cancel,
            "write",
            stream.write_all(&frame::encode_command(frame::PING)),
        )
        .await?;
        let reply = self.read_response(&mut stream, &cancel).await?;
        let text = String::from_utf8_lossy(&reply);
        Ok(text.trim_end_matches('\0').trim() == frame::PONG)
    }

    /// Stream `data` through the daemon and return its verdict.
    ///
    /// Transport failures (refusal, timeout, cancellation, oversized reply)
    /// yield an outcome with `completed == false`; they never surface as a
    /// panic or an implicit clean result. This is the fail-closed path.
    pub async fn scan(&self, data: &[u8], cancel: &CancellationToken) -> ScanOutcome {
        let start = Instant::now();
        tracing::debug!(
            host = %self.host,
            port = self.port,
            size_bytes = data.len(),
            "starting clamd scan"
        );

        let outcome = match self.scan_inner(data, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => ScanOutcome::failed(format!("clamd transport failure: {}", e)),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        if !outcome.completed {
            tracing::error!(
                duration_ms,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "clamd scan did not complete"
            );
        } else if outcome.clean {
            tracing::info!(duration_ms, "clamd scan completed: clean");
        } else {
            tracing::warn!(
                duration_ms,
                threat = outcome.threat_name.as_deref().unwrap_or("unknown"),
                "clamd scan detected a threat"
            );
        }
        outcome
    }

    async fn scan_inner(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> io::Result<ScanOutcome> {
        let mut stream = self.connect(cancel).await?;
        self.bounded(
            cancel,
            "write",
            stream.write_all(&frame::encode_command(frame::INSTREAM)),
        )
        .await?;

        // chunks() never yields an empty slice, so a zero length prefix only
        // ever appears as the terminator below
        for chunk in data.chunks(frame::CHUNK_SIZE) {
            self.bounded(cancel, "write", stream.write_all(&frame::encode_chunk(chunk)))
                .await?;
        }
        self.bounded(cancel, "write", stream.write_all(&frame::encode_chunk(&[])))
            .await?;

        let reply = self.read_response(&mut stream, cancel).await?;
        Ok(frame::decode_response(&reply))
    }
}

#[async_trait]
impl VirusScanner for ClamdClient {
    async fn ping(&self) -> bool {
        ClamdClient::ping(self).await
    }

    async fn scan(&self, data: &[u8], cancel: &CancellationToken) -> ScanOutcome {
        ClamdClient::scan(self, data, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_constructors() {
        let _client = ClamdClient::new("localhost", 3310, Duration::from_secs(30));
        let config = ScannerConfig {
            host: "localhost".to_string(),
            port: 3310,
            timeout_ms: 5_000,
        };
        let from_config = ClamdClient::from_config(&config);
        assert_eq!(from_config.timeout, Duration::from_millis(5_000));
    }
}
