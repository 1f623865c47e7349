//! Client configuration.
//!
//! A `ClientConfiguration` is created once at client construction and is
//! read-only thereafter. Per-call overrides never mutate it: `merge`
//! produces a fresh copy where only the fields the override sets are
//! replaced, so a previously set field is never null-overwritten.
//!
//! Endpoint and credentials can also be loaded from a TOML file and/or
//! `MOCHOW_*` environment variables:
//!
//! ```bash
//! MOCHOW_ENDPOINT=http://127.0.0.1:5287
//! MOCHOW_ACCOUNT=root
//! MOCHOW_API_KEY=...
//! ```

use std::sync::Arc;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::retry::{BackOffRetryPolicy, RetryPolicy};

/// Default connection timeout: 50 s.
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 50 * 1000;
/// Default send buffer size: 1 MiB.
pub const DEFAULT_SEND_BUF_SIZE: usize = 1024 * 1024;
/// Default receive buffer size: 10 MiB.
pub const DEFAULT_RECV_BUF_SIZE: usize = 10 * 1024 * 1024;

/// Configuration of a Mochow client.
///
/// Every field is optional; unset fields fall back to the defaults above at
/// the point of use. This is what makes the merge rule work: an override
/// only carries the fields it explicitly sets.
#[derive(Debug, Clone, Default)]
pub struct ClientConfiguration {
    pub credentials: Option<Credentials>,
    /// Service endpoint, e.g. `http://127.0.0.1:5287`. A bare `host:port`
    /// is treated as `http://host:port`.
    pub endpoint: Option<String>,
    pub connection_timeout_ms: Option<u64>,
    pub send_buf_size: Option<usize>,
    pub recv_buf_size: Option<usize>,
    /// Proxy URL applied to the connection pool.
    pub proxy: Option<String>,
    pub retry_policy: Option<Arc<dyn RetryPolicy>>,
}

impl ClientConfiguration {
    /// Configuration with the two fields every client needs.
    pub fn new(credentials: Credentials, endpoint: impl Into<String>) -> Self {
        ClientConfiguration {
            credentials: Some(credentials),
            endpoint: Some(endpoint.into()),
            ..ClientConfiguration::default()
        }
    }

    pub fn with_connection_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connection_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_send_buf_size(mut self, bytes: usize) -> Self {
        self.send_buf_size = Some(bytes);
        self
    }

    pub fn with_recv_buf_size(mut self, bytes: usize) -> Self {
        self.recv_buf_size = Some(bytes);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry_policy = Some(Arc::new(policy));
        self
    }

    /// Merge `other` over `self`: every field `other` sets wins, every field
    /// it leaves unset is inherited. Neither input is mutated.
    pub fn merge(&self, other: &ClientConfiguration) -> ClientConfiguration {
        ClientConfiguration {
            credentials: other
                .credentials
                .clone()
                .or_else(|| self.credentials.clone()),
            endpoint: other.endpoint.clone().or_else(|| self.endpoint.clone()),
            connection_timeout_ms: other.connection_timeout_ms.or(self.connection_timeout_ms),
            send_buf_size: other.send_buf_size.or(self.send_buf_size),
            recv_buf_size: other.recv_buf_size.or(self.recv_buf_size),
            proxy: other.proxy.clone().or_else(|| self.proxy.clone()),
            retry_policy: other
                .retry_policy
                .clone()
                .or_else(|| self.retry_policy.clone()),
        }
    }

    /// Load from `MOCHOW_*` environment variables.
    pub fn from_env() -> std::result::Result<Self, figment::Error> {
        let loaded: LoadedConfig = Figment::new().merge(Env::prefixed("MOCHOW_")).extract()?;
        Ok(loaded.into())
    }

    /// Load from a TOML file, with `MOCHOW_*` environment overrides.
    pub fn from_file(path: &str) -> std::result::Result<Self, figment::Error> {
        let loaded: LoadedConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MOCHOW_"))
            .extract()?;
        Ok(loaded.into())
    }

    // Resolved accessors used by the transport.

    pub(crate) fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| Error::client("endpoint not configured"))
    }

    pub(crate) fn credentials(&self) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| Error::client("credentials not configured"))
    }

    pub(crate) fn connection_timeout(&self) -> Duration {
        Duration::from_millis(
            self.connection_timeout_ms
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS),
        )
    }

    pub(crate) fn retry_policy(&self) -> Arc<dyn RetryPolicy> {
        self.retry_policy
            .clone()
            .unwrap_or_else(|| Arc::new(BackOffRetryPolicy::default()))
    }
}

/// Serde shape for file/env loading. Credentials are flattened into
/// account/api_key fields so they can be set as plain variables.
#[derive(Debug, Deserialize)]
struct LoadedConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    appbuilder_token: Option<String>,
    #[serde(default)]
    connection_timeout_ms: Option<u64>,
    #[serde(default)]
    send_buf_size: Option<usize>,
    #[serde(default)]
    recv_buf_size: Option<usize>,
    #[serde(default)]
    proxy: Option<String>,
}

impl From<LoadedConfig> for ClientConfiguration {
    fn from(loaded: LoadedConfig) -> Self {
        let credentials = match (loaded.account, loaded.api_key) {
            (Some(account), Some(api_key)) => Some(match loaded.appbuilder_token {
                Some(token) => Credentials::with_appbuilder_token(account, api_key, token),
                None => Credentials::new(account, api_key),
            }),
            _ => None,
        };
        ClientConfiguration {
            credentials,
            endpoint: loaded.endpoint,
            connection_timeout_ms: loaded.connection_timeout_ms,
            send_buf_size: loaded.send_buf_size,
            recv_buf_size: loaded.recv_buf_size,
            proxy: loaded.proxy,
            retry_policy: None,
        }
    }
}
