//! Wire codec for the clamd stream protocol.
//!
//! Commands are NUL-terminated tokens prefixed with `z`. INSTREAM payloads
//! travel as chunks of a 4-byte big-endian length prefix followed by the raw
//! bytes; a zero-length chunk terminates the stream. This module only
//! translates between buffers and the wire format; all I/O lives in
//! [`crate::client`].

use bytes::{BufMut, BytesMut};

use crate::ScanOutcome;

/// Liveness-probe command token
pub const PING: &str = "PING";
/// Streaming-scan command token
pub const INSTREAM: &str = "INSTREAM";
/// Expected liveness-probe reply (trailing NUL trimmed)
pub const PONG: &str = "PONG";
/// Recommended payload size for INSTREAM chunks
pub const CHUNK_SIZE: usize = 2048;

/// Encode a command as a NUL-terminated token: `z{name}\0`.
pub fn encode_command(name: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(name.len() + 2);
    buf.put_u8(b'z');
    buf.put_slice(name.as_bytes());
    buf.put_u8(0);
    buf.to_vec()
}

/// Encode one INSTREAM chunk: `uint32(big-endian length) || payload`.
///
/// An empty payload is the well-formed end-of-stream terminator. Callers must
/// guard `!payload.is_empty()` before encoding non-terminal chunks; the codec
/// cannot tell a terminator from a mid-stream mistake.
pub fn encode_chunk(payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    buf.to_vec()
}

/// Parse the daemon's one-line reply into a [`ScanOutcome`].
///
/// Trailing NULs and whitespace are stripped. A reply ending with `OK` is
/// clean; one containing `FOUND` is a detection whose threat name sits between
/// the first `:` and the `FOUND` marker; one containing `ERROR`, or anything
/// unrecognizable, yields an incomplete outcome.
pub fn decode_response(raw: &[u8]) -> ScanOutcome {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches('\0').trim();

    if text.is_empty() {
        return ScanOutcome::scan_error("empty reply from daemon", text);
    }
    if text.ends_with("OK") {
        return ScanOutcome::clean(text);
    }
    if text.contains("FOUND") {
        let threat = text
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(text)
            .trim_end_matches("FOUND")
            .trim();
        let threat = if threat.is_empty() { "unknown" } else { threat };
        return ScanOutcome::infected(threat, text);
    }
    if text.contains("ERROR") {
        return ScanOutcome::scan_error(format!("daemon reported an error: {}", text), text);
    }
    ScanOutcome::scan_error(format!("unrecognized daemon reply: {}", text), text)
}
