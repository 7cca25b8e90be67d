//! Server configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional YAML file (`-c <file>`)
//! 3. environment variables (`NANOSERVE_PORT`, `NANOSERVE_ROOT`)
//! 4. command-line flags
//!
//! The resulting [`ServerConfig`] is immutable for the life of the process and
//! shared read-only between connection tasks.

use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::cli::Args;
use crate::http::response::Protocol;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 5001;

/// Served root used when nothing else is configured.
pub const DEFAULT_ROOT: &str = "./static/";

pub const PORT_ENV: &str = "NANOSERVE_PORT";
pub const ROOT_ENV: &str = "NANOSERVE_ROOT";

/// Upper bounds on request size and on concurrent connections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Bytes read from the connection; anything past this is ignored.
    pub max_request_size: usize,
    /// Longest request path accepted before answering 414.
    pub max_path_len: usize,
    /// Connections served at once; further clients wait in the backlog.
    pub max_connections: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_request_size: 8192,
            max_path_len: 1024,
            max_connections: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// TCP port bound on all IPv4 interfaces.
    pub port: u16,
    /// Directory request paths are appended to. Trusted to exist.
    pub root_path: String,
    /// CRLF, HEAD support and version checking. `false` selects the legacy
    /// GET-only dialect with LF line endings.
    pub strict_http: bool,
    /// Refuse to serve files that resolve outside `root_path`.
    pub confine_to_root: bool,
    pub limits: Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root_path: DEFAULT_ROOT.to_string(),
            strict_http: true,
            confine_to_root: true,
            limits: Limits::default(),
        }
    }
}

impl ServerConfig {
    /// Builds the effective configuration for the given command line.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut cfg = match &args.config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        cfg.apply_env_from(|key| std::env::var(key).ok())?;
        cfg.apply_args(args);
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(raw)?)
    }

    /// Applies environment overrides, looking variables up through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("{PORT_ENV} is not a valid port: {port:?}"))?;
        }

        if let Some(root) = lookup(ROOT_ENV) {
            self.root_path = root;
        }

        Ok(())
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(root) = &args.root_path {
            self.root_path = root.clone();
        }
        if args.legacy {
            self.strict_http = false;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.limits.max_request_size == 0 {
            bail!("limits.max_request_size must be greater than zero");
        }
        if self.limits.max_path_len == 0 {
            bail!("limits.max_path_len must be greater than zero");
        }
        if self.limits.max_connections == 0 {
            bail!("limits.max_connections must be greater than zero");
        }
        Ok(())
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::from_strict(self.strict_http)
    }
}
