use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::ServerConfig;
use crate::http::connection::handle;

/// Pending connections the kernel queues before `accept`.
pub const BACKLOG: u32 = 1024;

/// Binds `0.0.0.0:port` with address reuse enabled. Failure is fatal; there
/// is no retry.
pub fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

    let socket = TcpSocket::new_v4().context("failed to open listening socket")?;
    socket
        .set_reuseaddr(true)
        .context("failed to enable address reuse")?;
    socket
        .bind(addr)
        .with_context(|| format!("failed to bind {addr}"))?;

    socket
        .listen(BACKLOG)
        .with_context(|| format!("failed to listen on {addr}"))
}

pub async fn run(cfg: ServerConfig) -> anyhow::Result<()> {
    let listener = bind(cfg.port)?;
    run_with_listener(listener, Arc::new(cfg)).await
}

/// Pause after an accept failure caused by resource exhaustion, so the loop
/// does not spin while descriptors or memory are short.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// How the accept loop reacts to a failed `accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptAction {
    /// The pending connection died before we got it; accept again at once.
    Retry,
    /// Out of descriptors, buffers or memory; wait `ACCEPT_BACKOFF`, then retry.
    Backoff,
    /// The listening socket itself is unusable.
    Fatal,
}

pub fn classify_accept_error(e: &std::io::Error) -> AcceptAction {
    match e.kind() {
        ErrorKind::ConnectionAborted
        | ErrorKind::ConnectionReset
        | ErrorKind::Interrupted
        | ErrorKind::WouldBlock => AcceptAction::Retry,
        ErrorKind::InvalidInput | ErrorKind::Unsupported | ErrorKind::NotConnected => {
            AcceptAction::Fatal
        }
        // EMFILE, ENFILE, ENOBUFS, ENOMEM and anything unclassified.
        _ => AcceptAction::Backoff,
    }
}

/// Accepts connections forever, one task per connection, with at most
/// `limits.max_connections` in flight. Only a fatal accept error ends the loop.
pub async fn run_with_listener(listener: TcpListener, cfg: Arc<ServerConfig>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        addr = %addr,
        root = %cfg.root_path,
        strict_http = cfg.strict_http,
        max_connections = cfg.limits.max_connections,
        "Listening"
    );

    let slots = Arc::new(Semaphore::new(cfg.limits.max_connections));

    loop {
        let permit = Arc::clone(&slots)
            .acquire_owned()
            .await
            .context("connection limiter closed")?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => match classify_accept_error(&e) {
                AcceptAction::Retry => {
                    warn!(error = %e, "Accept failed, continuing");
                    continue;
                }
                AcceptAction::Backoff => {
                    warn!(error = %e, "Accept failed, backing off");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
                AcceptAction::Fatal => return Err(e).context("accept failed"),
            },
        };

        let cfg = Arc::clone(&cfg);
        tokio::spawn(
            async move {
                if let Err(e) = handle(socket, &cfg).await {
                    error!("Connection error: {}", e);
                }
                drop(permit);
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}
