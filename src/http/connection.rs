use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::http::parser::parse_request_line;
use crate::http::request::ParsedRequest;
use crate::http::response::{Outcome, Protocol};
use crate::http::writer::{respond, write_status};
use crate::static_files::{confine_to_root, resolve};

/// Failures that end a connection early. Protocol problems such as an unknown
/// method or a missing file are not errors; they are answered with a status
/// code and reported as an [`Outcome`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed before a request was received")]
    EmptyRead,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// One accepted connection, serving exactly one request.
pub struct Connection<'a, S> {
    stream: S,
    config: &'a ServerConfig,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(ParsedRequest),
    Closed(Outcome),
}

impl<'a, S> Connection<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: &'a ServerConfig) -> Self {
        Self {
            stream,
            config,
            state: ConnectionState::Reading,
        }
    }

    /// Serves the request and closes the stream, on success and on error alike.
    pub async fn run(mut self) -> Result<Outcome, ConnectionError> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Shutdown after response failed");
        }
        // Dropping `self` releases the socket.

        result
    }

    async fn drive(&mut self) -> Result<Outcome, ConnectionError> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Reading) {
                ConnectionState::Reading => {
                    let request = self.read_request().await?;
                    self.state = ConnectionState::Processing(request);
                }

                ConnectionState::Processing(request) => {
                    let outcome = self.dispatch(&request).await?;
                    info!(
                        method = %request.method,
                        path = %request.raw_path,
                        version = %request.protocol_version,
                        status = outcome.status().as_u16(),
                        outcome = %outcome,
                        "Request served"
                    );
                    self.state = ConnectionState::Closed(outcome);
                }

                ConnectionState::Closed(outcome) => return Ok(outcome),
            }
        }
    }

    /// Reads once, up to the configured request size. A request that does not
    /// arrive in that single read is not reassembled.
    pub async fn read_request(&mut self) -> Result<ParsedRequest, ConnectionError> {
        let limit = self.config.limits.max_request_size;
        let mut buffer = BytesMut::with_capacity(limit);

        let n = (&mut self.stream)
            .take(limit as u64)
            .read_buf(&mut buffer)
            .await?;

        if n == 0 {
            return Err(ConnectionError::EmptyRead);
        }

        Ok(parse_request_line(&buffer))
    }

    async fn dispatch(&mut self, request: &ParsedRequest) -> Result<Outcome, ConnectionError> {
        let protocol = self.config.protocol();

        if !protocol.accepts_version(&request.protocol_version) {
            return self.reject(Outcome::UnsupportedVersion, protocol).await;
        }

        let Some(include_body) = protocol.include_body(request.method()) else {
            return self.reject(Outcome::UnsupportedMethod, protocol).await;
        };

        if request.raw_path.len() > self.config.limits.max_path_len {
            return self.reject(Outcome::UriTooLong, protocol).await;
        }

        let root = self.config.root_path.as_str();
        let mut target = resolve(root, &request.raw_path).await;
        if self.config.confine_to_root {
            target = confine_to_root(root, target).await;
        }

        Ok(respond(&mut self.stream, &target, include_body, protocol).await?)
    }

    async fn reject(&mut self, outcome: Outcome, protocol: Protocol) -> Result<Outcome, ConnectionError> {
        write_status(&mut self.stream, outcome.status(), protocol).await?;
        Ok(outcome)
    }
}

/// Handles one accepted connection from first byte to close.
pub async fn handle<S>(stream: S, config: &ServerConfig) -> Result<Outcome, ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    Connection::new(stream, config).run().await
}
