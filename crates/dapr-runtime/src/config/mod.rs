//! # Runtime Configuration
//!
//! TOML configuration for the runtime: how to reach the sidecar, which proxy
//! strategy to use and how to log.
//!
//! ```toml
//! [client]
//! http_host = "http://127.0.0.1:3500"
//! api_token = "secret"
//! timeout_ms = 5000
//!
//! [actors]
//! proxy_mode = "generated-cached"
//! cache_dir = "/var/cache/dapr-proxies"
//!
//! [logging]
//! level = "debug"
//! output = "file"
//! file_path = "logs/dapr-runtime.log"
//! ```
//!
//! Every section and field is optional.

use anyhow::{Context, Result};
use dapr_client::{DaprClientBuilder, HttpInvocationClient, InvocationClient};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::actor::{ProxyFactory, ProxyMode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub client: ClientConfig,
    pub actors: ActorsConfig,
    pub logging: LoggingConfig,
}

/// How to reach the sidecar.
///
/// Unset fields fall back to the sidecar environment: `DAPR_HTTP_PORT` for
/// the port and `DAPR_API_TOKEN` for the token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full base URL; takes precedence over `dapr_port`.
    pub http_host: Option<String>,
    pub dapr_port: Option<u16>,
    pub api_token: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorsConfig {
    pub proxy_mode: ProxyMode,
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub output: LogOutput,
    pub file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}

impl LoggingConfig {
    pub fn log_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs/dapr-runtime.log"))
    }
}

impl RuntimeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        content
            .parse::<Self>()
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Builds the HTTP client described by the `[client]` section.
    pub fn build_client(&self) -> Result<HttpInvocationClient> {
        let mut builder = DaprClientBuilder::new();
        if let Some(host) = &self.client.http_host {
            builder = builder.use_http_host(host.clone());
        } else if let Some(port) = self.client.dapr_port {
            builder = builder.use_http_host(format!("http://127.0.0.1:{}", port));
        }
        if let Some(token) = &self.client.api_token {
            builder = builder.with_api_token(token.clone());
        }
        if let Some(timeout_ms) = self.client.timeout_ms {
            builder = builder.with_timeout(Duration::from_millis(timeout_ms));
        }

        let http_host = builder.http_host().to_string();
        builder
            .build()
            .with_context(|| format!("Failed to build dapr client for {}", http_host))
    }

    /// Builds a proxy factory for the `[actors]` section around `client`.
    pub fn proxy_factory(&self, client: Arc<dyn InvocationClient>) -> ProxyFactory {
        debug!("Using {} proxy mode", self.actors.proxy_mode);
        let factory = ProxyFactory::new(self.actors.proxy_mode, client);
        match &self.actors.cache_dir {
            Some(cache_dir) => factory.with_cache_dir(cache_dir.clone()),
            None => factory,
        }
    }
}

impl FromStr for RuntimeConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: RuntimeConfig = "".parse().unwrap();
        assert_eq!(config.actors.proxy_mode, ProxyMode::Generated);
        assert_eq!(config.actors.cache_dir, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.output, LogOutput::Stdout);
        assert_eq!(config.client.http_host, None);
    }

    #[test]
    fn test_proxy_mode_by_name_or_code() {
        let config: RuntimeConfig = "[actors]\nproxy_mode = \"only-existing\"".parse().unwrap();
        assert_eq!(config.actors.proxy_mode, ProxyMode::OnlyExisting);

        let config: RuntimeConfig = "[actors]\nproxy_mode = 1".parse().unwrap();
        assert_eq!(config.actors.proxy_mode, ProxyMode::GeneratedCached);
    }

    #[test]
    fn test_invalid_proxy_mode_is_rejected() {
        let result = "[actors]\nproxy_mode = 3".parse::<RuntimeConfig>();
        assert!(result.is_err());
        let result = "[actors]\nproxy_mode = \"reflective\"".parse::<RuntimeConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[client]
http_host = "http://localhost:3501"
api_token = "secret"
timeout_ms = 250

[actors]
proxy_mode = "generated-cached"
cache_dir = "/tmp/proxies"

[logging]
level = "debug"
output = "file"
file_path = "logs/runtime.log"
"#
        )
        .unwrap();

        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.client.http_host.as_deref(), Some("http://localhost:3501"));
        assert_eq!(config.client.timeout_ms, Some(250));
        assert_eq!(config.actors.proxy_mode, ProxyMode::GeneratedCached);
        assert_eq!(config.actors.cache_dir, Some(PathBuf::from("/tmp/proxies")));
        assert_eq!(config.logging.output, LogOutput::File);
        assert_eq!(config.logging.log_path(), PathBuf::from("logs/runtime.log"));

        let client = config.build_client().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3501/");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = RuntimeConfig::from_file("/nonexistent/dapr.toml").unwrap_err();
        assert!(error.to_string().contains("/nonexistent/dapr.toml"));
    }

    #[test]
    fn test_dapr_port_sets_host() {
        let config: RuntimeConfig = "[client]\ndapr_port = 3600".parse().unwrap();
        let client = config.build_client().unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:3600/");
    }
}
