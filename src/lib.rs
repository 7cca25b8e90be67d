//! nanoserve - Minimal static file server
//!
//! Answers `GET` and `HEAD` requests for files under a served root, one
//! request per connection.

pub mod cli;
pub mod config;
pub mod http;
pub mod server;
pub mod static_files;
