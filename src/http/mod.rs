//! HTTP protocol implementation.
//!
//! A deliberately small subset of HTTP/1.0: one request line in, one response
//! out, then the connection is closed. Request headers and bodies are never
//! looked at.
//!
//! # Architecture
//!
//! - **`connection`**: Drives one accepted connection through read, dispatch and close
//! - **`parser`**: Splits the request line into method, path and version
//! - **`request`**: Parsed request plus the methods and versions we understand
//! - **`response`**: Status codes, protocol dialects and request outcomes
//! - **`writer`**: Writes status lines and headers, and streams files
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Single read of the request
//!        └──────┬──────┘
//!               │ Request line parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Check version and method, resolve, respond
//!        └──────┬───────────┘
//!               │ Response written
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← Stream shut down and dropped
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use nanoserve::config::ServerConfig;
//! use nanoserve::http::connection::handle;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:5001").await?;
//!     let config = std::sync::Arc::new(ServerConfig::default());
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let config = config.clone();
//!         tokio::spawn(async move {
//!             if let Err(e) = handle(socket, &config).await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
