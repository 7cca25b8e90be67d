use std::io::ErrorKind;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Outcome, Protocol, ResponseHead, StatusCode};
use crate::static_files::ResolvedTarget;

/// Version written on every status line, whatever the client asked for.
const HTTP_VERSION: &str = "HTTP/1.0";

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

/// File contents are copied to the client this many bytes at a time.
const CHUNK_SIZE: usize = 8192;

/// Serializes the status line, headers and the blank line ending them.
pub fn serialize_head(head: &ResponseHead, protocol: Protocol) -> Vec<u8> {
    let eol = protocol.line_ending();
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}{}",
        HTTP_VERSION,
        head.status.as_u16(),
        head.status.reason_phrase(),
        eol
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(eol.as_bytes());
    }

    // Header/body separator
    buf.extend_from_slice(eol.as_bytes());

    buf
}

/// Writes a bodiless response carrying only `status`.
pub async fn write_status<W>(sink: &mut W, status: StatusCode, protocol: Protocol) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = serialize_head(&ResponseHead::new(status), protocol);
    sink.write_all(&head).await?;
    sink.flush().await
}

/// Answers a request for `target`.
///
/// Decides between 404, 403 and 200 in that order. On 200 the `Server`
/// header is always sent, while `Content-Length` and the file contents are
/// sent only when `include_body` is set. Write failures abort the response
/// and are returned as is; nothing already written is repaired.
pub async fn respond<W>(
    sink: &mut W,
    target: &ResolvedTarget,
    include_body: bool,
    protocol: Protocol,
) -> std::io::Result<Outcome>
where
    W: AsyncWrite + Unpin,
{
    if !target.exists {
        write_status(sink, StatusCode::NotFound, protocol).await?;
        return Ok(Outcome::NotFound);
    }

    let file = match File::open(&target.filesystem_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            write_status(sink, StatusCode::Forbidden, protocol).await?;
            return Ok(Outcome::Forbidden);
        }
        // Removed between stat and open.
        Err(e) if e.kind() == ErrorKind::NotFound => {
            write_status(sink, StatusCode::NotFound, protocol).await?;
            return Ok(Outcome::NotFound);
        }
        Err(e) => return Err(e),
    };

    let mut head = ResponseHead::new(StatusCode::Ok).header("Server", SERVER_NAME);
    if include_body {
        head = head.header("Content-Length", target.size.to_string());
    }
    sink.write_all(&serialize_head(&head, protocol)).await?;

    if include_body {
        // Never send more than was advertised, even if the file grew.
        let sent = stream_body(file.take(target.size), sink).await?;
        if sent < target.size {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("file shrank while sending: {sent} of {} bytes", target.size),
            ));
        }
    }

    sink.flush().await?;
    Ok(Outcome::Ok)
}

/// Copies `source` to `sink` in fixed-size chunks, returning the byte count.
async fn stream_body<R, W>(mut source: R, sink: &mut W) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = source.read(&mut chunk).await?;
        if n == 0 {
            break;
        }

        sink.write_all(&chunk[..n]).await?;
        written += n as u64;
    }

    Ok(written)
}
