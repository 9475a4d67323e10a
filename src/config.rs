//! Client configuration parsed from environment variables.
//!
//! The endpoint is the only thing that differed between the local and the
//! deployed builds of the chat client, so it is plain configuration here.
//! CLI flags in `main.rs` override whatever the environment provides.

use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_URL: &str = "http://localhost:3001";
pub const DEFAULT_RECONNECT_INITIAL_MS: u64 = 1000;
pub const DEFAULT_RECONNECT_MAX_MS: u64 = 10_000;
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Exponential backoff between connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_ms: u64,
    pub max_ms: u64,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { initial_ms: DEFAULT_RECONNECT_INITIAL_MS, max_ms: DEFAULT_RECONNECT_MAX_MS, max_attempts: None }
    }
}

impl ReconnectPolicy {
    /// Base delay before reconnect attempt `attempt` (1-based), before jitter.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let ms = self.initial_ms.saturating_mul(1_u64 << exponent).min(self.max_ms);
        Duration::from_millis(ms)
    }

    /// Whether another attempt is allowed after `attempt` failures.
    #[must_use]
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Chat server endpoint, `http(s)://` or `ws(s)://`.
    pub url: String,
    pub reconnect: ReconnectPolicy,
    /// Capacity of the inbound event queue between transport and client.
    pub event_buffer: usize,
    /// Re-send `join` after the transport reconnects.
    pub rejoin_on_reconnect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            reconnect: ReconnectPolicy::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            rejoin_on_reconnect: true,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `UNICHAT_URL`: default `http://localhost:3001`
    /// - `UNICHAT_RECONNECT_INITIAL_MS`: default 1000
    /// - `UNICHAT_RECONNECT_MAX_MS`: default 10000
    /// - `UNICHAT_MAX_RECONNECT_ATTEMPTS`: unlimited when absent
    /// - `UNICHAT_EVENT_BUFFER`: default 256
    /// - `UNICHAT_REJOIN_ON_RECONNECT`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when a variable is present but does not parse.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`ClientConfig::from_env`] but reading from an arbitrary source.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when a value is present but does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("UNICHAT_URL")
            .map(|v| v.trim().trim_end_matches('/').to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_owned());

        let reconnect = ReconnectPolicy {
            initial_ms: parse_or(&lookup, "UNICHAT_RECONNECT_INITIAL_MS", DEFAULT_RECONNECT_INITIAL_MS)?,
            max_ms: parse_or(&lookup, "UNICHAT_RECONNECT_MAX_MS", DEFAULT_RECONNECT_MAX_MS)?,
            max_attempts: parse_optional(&lookup, "UNICHAT_MAX_RECONNECT_ATTEMPTS")?,
        };
        if reconnect.initial_ms == 0 || reconnect.max_ms < reconnect.initial_ms {
            return Err(ClientError::Config(format!(
                "reconnect delays must satisfy 0 < initial ({}) <= max ({})",
                reconnect.initial_ms, reconnect.max_ms
            )));
        }

        let event_buffer = parse_or(&lookup, "UNICHAT_EVENT_BUFFER", DEFAULT_EVENT_BUFFER)?.max(1);
        let rejoin_on_reconnect = parse_bool(&lookup, "UNICHAT_REJOIN_ON_RECONNECT", true)?;

        Ok(Self { url, reconnect, event_buffer, rejoin_on_reconnect })
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ClientError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ClientError::Config(format!("{key}: cannot parse '{raw}'")))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ClientError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClientError::Config(format!("{key}: expected a boolean, got '{raw}'"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
