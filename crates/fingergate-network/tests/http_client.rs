//! Integration tests for HttpEnrollmentClient
//!
//! A hand-written HTTP/1.1 server on a local TcpListener stands in for the
//! enrollment server so the real multipart encoding and timeouts are
//! exercised.

use fingergate_core::{FingerType, HardwareId};
use fingergate_network::{
    EnrollmentTransport, HttpClientConfig, HttpEnrollmentClient, TransportError,
};
use fingergate_protocol::EnrollmentRequest;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const ENCRYPTED: &[u8] = b"\x00\x01\x02\x03IV-and-ciphertext\xff\xfe";

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Read one full request: headers plus a Content-Length body, or up to the
/// closing multipart boundary / last chunk when no length is sent.
async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return buf;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = find(&buf, b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());

        let done = match length {
            Some(len) => buf.len() >= header_end + 4 + len,
            None => buf.ends_with(b"--\r\n") || buf.ends_with(b"0\r\n\r\n"),
        };
        if done {
            return buf;
        }
    }
}

/// Serve exactly one request with the given status line and body, returning
/// the raw request bytes.
async fn serve_once(
    status: &str,
    extra_headers: &str,
    body: &str,
) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });

    (addr, handle)
}

fn client_for(addr: SocketAddr, timeout: Duration) -> HttpEnrollmentClient {
    HttpEnrollmentClient::new(HttpClientConfig {
        endpoint: format!("http://{addr}/api/v1/enrollments"),
        timeout,
        connect_timeout: timeout,
    })
    .unwrap()
}

fn request_in(dir: &Path) -> EnrollmentRequest {
    let path = dir.join("finger_20240101_120000.bmp.enc");
    std::fs::write(&path, ENCRYPTED).unwrap();
    EnrollmentRequest::new(
        path,
        FingerType::Index,
        HardwareId::new("B8:27:EB:12:AB:CD").unwrap(),
    )
}

#[tokio::test]
async fn test_posts_multipart_form_and_returns_body() {
    let body = r#"{"success":true,"message":"ok","nameOfUser":"Alice"}"#;
    let (addr, server) = serve_once("200 OK", "", body).await;
    let dir = TempDir::new().unwrap();
    let request = request_in(dir.path());

    let response = client_for(addr, Duration::from_secs(5))
        .submit(&request)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_success());
    assert_eq!(response.body, body);

    let raw = server.await.unwrap();
    let text = String::from_utf8_lossy(&raw);
    let lower = text.to_ascii_lowercase();
    assert!(text.starts_with("POST /api/v1/enrollments HTTP/1.1\r\n"));
    assert!(lower.contains("content-type: multipart/form-data; boundary="));
    assert!(lower.contains(
        r#"content-disposition: form-data; name="file"; filename="finger_20240101_120000.bmp.enc""#
    ));
    assert!(lower.contains("content-type: application/octet-stream"));
    assert!(text.contains("name=\"type\"\r\n\r\nINDEX\r\n"));
    assert!(text.contains("name=\"hardwareId\"\r\n\r\nB8:27:EB:12:AB:CD\r\n"));
    assert!(find(&raw, ENCRYPTED).is_some());

    // The transport never deletes the file.
    assert!(request.encrypted_file.exists());
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() {
    let body = r#"{"success":false,"message":"Internal error"}"#;
    let (addr, server) = serve_once("500 Internal Server Error", "", body).await;
    let dir = TempDir::new().unwrap();

    let response = client_for(addr, Duration::from_secs(5))
        .submit(&request_in(dir.path()))
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert!(!response.is_success());
    assert_eq!(response.body, body);
    server.await.unwrap();
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    // A second listener that must never see a request.
    let elsewhere = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let elsewhere_addr = elsewhere.local_addr().unwrap();
    let location = format!("Location: http://{elsewhere_addr}/steal\r\n");

    let (addr, server) = serve_once("302 Found", &location, "").await;
    let dir = TempDir::new().unwrap();

    let response = client_for(addr, Duration::from_secs(5))
        .submit(&request_in(dir.path()))
        .await
        .unwrap();

    assert_eq!(response.status, 302);
    server.await.unwrap();

    let followed = tokio::time::timeout(Duration::from_millis(200), elsewhere.accept()).await;
    assert!(followed.is_err(), "client followed the redirect");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = TempDir::new().unwrap();

    let result = client_for(addr, Duration::from_secs(2))
        .submit(&request_in(dir.path()))
        .await;

    assert!(matches!(result, Err(TransportError::Connect(_))), "{result:?}");
}

#[tokio::test]
async fn test_hung_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_request(&mut stream).await;
        // Hold the connection open without answering.
        tokio::time::sleep(Duration::from_secs(5)).await;
    });
    let dir = TempDir::new().unwrap();

    let result = client_for(addr, Duration::from_millis(300))
        .submit(&request_in(dir.path()))
        .await;

    assert!(matches!(result, Err(TransportError::Timeout(300))), "{result:?}");
    server.abort();
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let request = EnrollmentRequest::new(
        dir.path().join("gone.enc"),
        FingerType::Thumb,
        HardwareId::new("door-1").unwrap(),
    );

    let client = HttpEnrollmentClient::new(HttpClientConfig::default()).unwrap();
    let result = client.submit(&request).await;

    assert!(matches!(result, Err(TransportError::ReadFile { .. })));
}
