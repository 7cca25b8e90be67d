use std::fs;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use nanoserve::http::response::{Outcome, Protocol, ResponseHead, StatusCode};
use nanoserve::http::writer::{SERVER_NAME, respond, serialize_head, write_status};
use nanoserve::static_files::{ResolvedTarget, resolve};
use tokio::io::AsyncWrite;

/// Sink that refuses every write.
struct BrokenPipe;

impl AsyncWrite for BrokenPipe {
    fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away")))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

fn ok_head(len: usize) -> String {
    format!("HTTP/1.0 200 OK\r\nServer: {SERVER_NAME}\r\nContent-Length: {len}\r\n\r\n")
}

#[test]
fn test_server_name() {
    assert_eq!(SERVER_NAME, format!("nanoserve-{}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_serialize_head_strict() {
    let head = ResponseHead::new(StatusCode::Ok).header("Server", "x");

    assert_eq!(
        serialize_head(&head, Protocol::Strict),
        b"HTTP/1.0 200 OK\r\nServer: x\r\n\r\n".to_vec()
    );
}

#[test]
fn test_serialize_head_legacy() {
    let head = ResponseHead::new(StatusCode::NotFound);

    assert_eq!(
        serialize_head(&head, Protocol::Legacy),
        b"HTTP/1.0 404 Not Found\n\n".to_vec()
    );
}

#[tokio::test]
async fn test_write_status() {
    let mut sink = Vec::new();
    write_status(&mut sink, StatusCode::HttpVersionNotSupported, Protocol::Strict)
        .await
        .unwrap();

    assert_eq!(sink, b"HTTP/1.0 505 HTTP Version Not Supported\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_respond_missing_is_404_without_body() {
    for include_body in [true, false] {
        let mut sink = Vec::new();
        let outcome = respond(
            &mut sink,
            &ResolvedTarget::missing("/nonexistent"),
            include_body,
            Protocol::Strict,
        )
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::NotFound);
        assert_eq!(sink, b"HTTP/1.0 404 Not Found\r\n\r\n".to_vec());
    }
}

#[tokio::test]
async fn test_respond_get_sends_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hi").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/a.txt").await;

    let mut sink = Vec::new();
    let outcome = respond(&mut sink, &target, true, Protocol::Strict).await.unwrap();

    assert_eq!(outcome, Outcome::Ok);
    assert_eq!(String::from_utf8(sink).unwrap(), format!("{}hi", ok_head(2)));
}

#[tokio::test]
async fn test_respond_head_omits_length_and_body() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hi").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/a.txt").await;

    let mut sink = Vec::new();
    let outcome = respond(&mut sink, &target, false, Protocol::Strict).await.unwrap();

    assert_eq!(outcome, Outcome::Ok);
    assert_eq!(
        String::from_utf8(sink).unwrap(),
        format!("HTTP/1.0 200 OK\r\nServer: {SERVER_NAME}\r\n\r\n")
    );
}

#[tokio::test]
async fn test_respond_legacy_line_endings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hi").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/a.txt").await;

    let mut sink = Vec::new();
    respond(&mut sink, &target, true, Protocol::Legacy).await.unwrap();

    assert_eq!(
        String::from_utf8(sink).unwrap(),
        format!("HTTP/1.0 200 OK\nServer: {SERVER_NAME}\nContent-Length: 2\n\nhi")
    );
}

#[tokio::test]
async fn test_respond_streams_large_file_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let contents: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(dir.path().join("big.bin"), &contents).unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/big.bin").await;

    let mut sink = Vec::new();
    respond(&mut sink, &target, true, Protocol::Strict).await.unwrap();

    let head = ok_head(contents.len());
    assert!(sink.starts_with(head.as_bytes()));
    assert_eq!(&sink[head.len()..], &contents[..]);
}

#[tokio::test]
async fn test_respond_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/empty").await;

    let mut sink = Vec::new();
    respond(&mut sink, &target, true, Protocol::Strict).await.unwrap();

    assert_eq!(String::from_utf8(sink).unwrap(), ok_head(0));
}

#[tokio::test]
async fn test_respond_file_removed_after_resolve() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gone.txt"), b"bye").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/gone.txt").await;
    fs::remove_file(dir.path().join("gone.txt")).unwrap();

    let mut sink = Vec::new();
    let outcome = respond(&mut sink, &target, true, Protocol::Strict).await.unwrap();

    assert_eq!(outcome, Outcome::NotFound);
    assert_eq!(sink, b"HTTP/1.0 404 Not Found\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_respond_body_never_exceeds_advertised_length() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("grow.txt"), b"hi").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/grow.txt").await;
    fs::write(dir.path().join("grow.txt"), b"hi there").unwrap();

    let mut sink = Vec::new();
    respond(&mut sink, &target, true, Protocol::Strict).await.unwrap();

    assert_eq!(String::from_utf8(sink).unwrap(), format!("{}hi", ok_head(2)));
}

#[tokio::test]
async fn test_respond_shrunk_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("shrink.txt"), b"hello").unwrap();
    let target = resolve(dir.path().to_str().unwrap(), "/shrink.txt").await;
    fs::write(dir.path().join("shrink.txt"), b"he").unwrap();

    let mut sink = Vec::new();
    let err = respond(&mut sink, &target, true, Protocol::Strict).await.unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[tokio::test]
async fn test_respond_write_failure_is_surfaced() {
    let err = respond(
        &mut BrokenPipe,
        &ResolvedTarget::missing("/x"),
        true,
        Protocol::Strict,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}

#[cfg(unix)]
#[tokio::test]
async fn test_respond_unreadable_file_is_403() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.txt");
    fs::write(&path, b"secret").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not apply to root.
    if fs::File::open(&path).is_ok() {
        eprintln!("skipping test_respond_unreadable_file_is_403: running with root privileges");
        return;
    }

    let target = resolve(dir.path().to_str().unwrap(), "/locked.txt").await;
    assert!(target.exists);

    let mut sink = Vec::new();
    let outcome = respond(&mut sink, &target, true, Protocol::Strict).await.unwrap();

    assert_eq!(outcome, Outcome::Forbidden);
    assert_eq!(sink, b"HTTP/1.0 403 Forbidden\r\n\r\n".to_vec());
}
