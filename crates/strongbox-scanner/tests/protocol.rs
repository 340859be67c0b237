//! Protocol tests against a loopback fake daemon.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use strongbox_scanner::ClamdClient;

/// How the fake daemon answers a session.
#[derive(Clone)]
enum Reply {
    /// Answer the given bytes after consuming the request
    Text(&'static [u8]),
    /// Consume the request, then never answer
    Stall,
}

/// Read the NUL-terminated command token.
async fn read_command(stream: &mut TcpStream) -> Vec<u8> {
    let mut command = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await.unwrap();
        assert!(n > 0, "peer closed before command terminator");
        if byte[0] == 0 {
            break;
        }
        command.push(byte[0]);
    }
    command
}

/// Read length-prefixed chunks until the zero-length terminator, returning
/// the reassembled payload.
async fn read_instream_payload(stream: &mut TcpStream) -> Vec<u8> {
    let mut payload = Vec::new();
    loop {
        let mut prefix = [0u8; 4];
        stream.read_exact(&mut prefix).await.unwrap();
        let len = u32::from_be_bytes(prefix) as usize;
        if len == 0 {
            break;
        }
        let mut chunk = vec![0u8; len];
        stream.read_exact(&mut chunk).await.unwrap();
        payload.extend_from_slice(&chunk);
    }
    payload
}

/// Spawn a daemon that serves exactly one session and reports the payload it
/// received (empty for PING sessions).
async fn spawn_daemon(reply: Reply) -> (SocketAddr, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let command = read_command(&mut stream).await;

        let payload = if command == b"zINSTREAM" {
            read_instream_payload(&mut stream).await
        } else {
            assert_eq!(command, b"zPING");
            Vec::new()
        };
        let _ = tx.send(payload);

        match reply {
            Reply::Text(bytes) => {
                stream.write_all(bytes).await.unwrap();
            }
            Reply::Stall => {
                // hold the connection open without answering
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        }
    });

    (addr, rx)
}

fn client_for(addr: SocketAddr) -> ClamdClient {
    ClamdClient::new(addr.ip().to_string(), addr.port(), Duration::from_millis(500))
}

#[tokio::test]
async fn ping_succeeds_on_exact_pong() {
    let (addr, _rx) = spawn_daemon(Reply::Text(b"PONG\0")).await;
    assert!(client_for(addr).ping().await);
}

#[tokio::test]
async fn ping_fails_on_unexpected_reply() {
    let (addr, _rx) = spawn_daemon(Reply::Text(b"WHAT\0")).await;
    assert!(!client_for(addr).ping().await);
}

#[tokio::test]
async fn ping_fails_on_connection_refusal() {
    // bind then drop to obtain a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(!client_for(addr).ping().await);
}

#[tokio::test]
async fn ping_fails_on_timeout() {
    let (addr, _rx) = spawn_daemon(Reply::Stall).await;
    assert!(!client_for(addr).ping().await);
}

#[tokio::test]
async fn scan_streams_payload_and_reports_clean() {
    let (addr, rx) = spawn_daemon(Reply::Text(b"stream: OK\0")).await;
    let payload: Vec<u8> = (0..10_000).map(|i| (i % 251) as u8).collect();

    let outcome = client_for(addr)
        .scan(&payload, &CancellationToken::new())
        .await;

    assert!(outcome.is_safe());
    assert_eq!(outcome.raw_response, "stream: OK");
    // the daemon reassembled exactly the bytes we streamed
    assert_eq!(rx.await.unwrap(), payload);
}

#[tokio::test]
async fn scan_surfaces_detection_with_threat_name() {
    let (addr, _rx) = spawn_daemon(Reply::Text(b"stream: Eicar-Test-Signature FOUND\0")).await;

    let outcome = client_for(addr)
        .scan(b"malicious bytes", &CancellationToken::new())
        .await;

    assert!(outcome.completed);
    assert!(!outcome.clean);
    assert_eq!(outcome.threat_name.as_deref(), Some("Eicar-Test-Signature"));
}

#[tokio::test]
async fn scan_fails_closed_when_daemon_reports_error() {
    let (addr, _rx) = spawn_daemon(Reply::Text(b"INSTREAM size limit exceeded. ERROR\0")).await;

    let outcome = client_for(addr)
        .scan(b"some bytes", &CancellationToken::new())
        .await;

    assert!(!outcome.completed);
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn scan_fails_closed_when_daemon_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = client_for(addr)
        .scan(b"some bytes", &CancellationToken::new())
        .await;

    assert!(!outcome.completed);
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn scan_fails_closed_on_timeout() {
    let (addr, _rx) = spawn_daemon(Reply::Stall).await;

    let outcome = client_for(addr)
        .scan(b"some bytes", &CancellationToken::new())
        .await;

    assert!(!outcome.completed);
    assert!(outcome.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn scan_aborts_when_cancelled() {
    let (addr, _rx) = spawn_daemon(Reply::Stall).await;
    let cancel = CancellationToken::new();

    let client = ClamdClient::new(addr.ip().to_string(), addr.port(), Duration::from_secs(30));

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = client.scan(b"some bytes", &cancel).await;

    assert!(!outcome.completed);
    assert!(outcome.error.unwrap().contains("aborted"));
}
