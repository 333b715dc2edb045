//! Server configuration.
//!
//! Priority (highest to lowest): CLI flags / environment, `--config` TOML
//! file, defaults.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::gateway::DEFAULT_REMOTE_TIMEOUT;
use crate::server::{DEFAULT_READ_TIMEOUT, Limits};

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen: SocketAddr,
    pub max_body_bytes: usize,
    /// How long a client may take to send its request.
    pub request_timeout_ms: u64,
    pub remote: Option<RemoteConfig>,
}

/// Remote analyzer the gateway delegates to before analyzing locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_REMOTE_TIMEOUT.as_millis() as u64
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            remote: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_body_bytes: self.max_body_bytes,
            read_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        listen: Option<SocketAddr>,
        remote_url: Option<String>,
        remote_timeout_ms: Option<u64>,
    ) -> Self {
        if let Some(listen) = listen {
            self.listen = listen;
        }
        if let Some(url) = remote_url {
            let timeout_ms = self
                .remote
                .as_ref()
                .map(|r| r.timeout_ms)
                .unwrap_or_else(default_timeout_ms);
            self.remote = Some(RemoteConfig { url, timeout_ms });
        }
        if let (Some(timeout_ms), Some(remote)) = (remote_timeout_ms, self.remote.as_mut()) {
            remote.timeout_ms = timeout_ms;
        }
        self
    }
}
