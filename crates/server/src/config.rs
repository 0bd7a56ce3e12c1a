use std::time::Duration;

use anyhow::{Context, Result};
use tcp_http::server::ServerConfig;
use tracing::Level;

const ADDR_VAR: &str = "TCP_HTTP_ADDR";
const LOG_VAR: &str = "TCP_HTTP_LOG";
const READ_TIMEOUT_VAR: &str = "TCP_HTTP_READ_TIMEOUT_SECS";
const MAX_BODY_BYTES_VAR: &str = "TCP_HTTP_MAX_BODY_BYTES";

const DEFAULT_ADDR: &str = "0.0.0.0:42069";

/// Settings of the demo server, read from `TCP_HTTP_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub log_level: Level,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// A read timeout of `0` seconds disables the timeout.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let log_level = match lookup(LOG_VAR) {
            Some(level) => level.parse::<Level>().with_context(|| format!("invalid {LOG_VAR}: {level}"))?,
            None => Level::INFO,
        };

        let mut server = ServerConfig::default();

        if let Some(secs) = lookup(READ_TIMEOUT_VAR) {
            let secs = secs.parse::<u64>().with_context(|| format!("invalid {READ_TIMEOUT_VAR}: {secs}"))?;
            server = server.with_read_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }

        if let Some(bytes) = lookup(MAX_BODY_BYTES_VAR) {
            let bytes = bytes.parse::<usize>().with_context(|| format!("invalid {MAX_BODY_BYTES_VAR}: {bytes}"))?;
            server = server.with_max_body_bytes(bytes);
        }

        Ok(Self { addr, log_level, server })
    }
}
