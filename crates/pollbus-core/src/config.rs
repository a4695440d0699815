//! Bus configuration.
//!
//! | Option | Default | Environment |
//! |--------|---------|-------------|
//! | `capacity` | 20 | `POLLBUS_CAPACITY` |
//! | `poll_timeout` | 10 s | `POLLBUS_POLL_TIMEOUT_SECS` |
//! | `sleep_interval` | 200 ms | `POLLBUS_SLEEP_INTERVAL_MS` |
//! | `store_key` | `chat_messages` | `POLLBUS_STORE_KEY` |
//! | `stale_cursor` | `resync` | `POLLBUS_STALE_CURSOR` |
//!
//! ```
//! use pollbus_core::BusConfig;
//!
//! let config = BusConfig {
//!     capacity: 3,
//!     ..Default::default()
//! };
//! assert_eq!(config.store_key, "chat_messages");
//! ```

use std::str::FromStr;
use std::time::Duration;

use crate::error::{BusError, Result};

pub const DEFAULT_CAPACITY: usize = 20;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SLEEP_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_STORE_KEY: &str = "chat_messages";

/// What `messages_since` does with a cursor that matches no stored message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaleCursorPolicy {
    /// Treat the cursor like a fresh client: deliver the whole log.
    #[default]
    Resync,
    /// Fail with [`BusError::StaleCursor`] so the client can reset.
    Reject,
}

impl FromStr for StaleCursorPolicy {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resync" => Ok(Self::Resync),
            "reject" => Ok(Self::Reject),
            other => Err(BusError::Config(format!(
                "unknown stale cursor policy {:?} (expected resync or reject)",
                other
            ))),
        }
    }
}

/// Configuration for a [`MessageLog`](crate::MessageLog) and its
/// [`PollCoordinator`](crate::PollCoordinator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Maximum number of messages kept; older ones are evicted first.
    pub capacity: usize,
    /// How long a poll waits for new data before answering with nothing.
    pub poll_timeout: Duration,
    /// Pause between two reads of the shared snapshot while waiting.
    pub sleep_interval: Duration,
    /// Shared store key holding the serialized log.
    pub store_key: String,
    pub stale_cursor: StaleCursorPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            sleep_interval: DEFAULT_SLEEP_INTERVAL,
            store_key: DEFAULT_STORE_KEY.to_string(),
            stale_cursor: StaleCursorPolicy::default(),
        }
    }
}

impl BusConfig {
    /// Defaults overridden by `POLLBUS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(capacity) = parse_var::<usize>(&lookup, "POLLBUS_CAPACITY")? {
            config.capacity = capacity;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "POLLBUS_POLL_TIMEOUT_SECS")? {
            config.poll_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "POLLBUS_SLEEP_INTERVAL_MS")? {
            config.sleep_interval = Duration::from_millis(ms);
        }
        if let Some(key) = lookup("POLLBUS_STORE_KEY") {
            config.store_key = key;
        }
        if let Some(policy) = parse_var::<StaleCursorPolicy>(&lookup, "POLLBUS_STALE_CURSOR")? {
            config.stale_cursor = policy;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the log and coordinator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BusError::Config("capacity must be at least 1".into()));
        }
        if self.sleep_interval.is_zero() {
            return Err(BusError::Config("sleep interval must be non-zero".into()));
        }
        if self.store_key.trim().is_empty() {
            return Err(BusError::Config("store key must not be empty".into()));
        }
        Ok(())
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| BusError::Config(format!("{}={:?}: {}", name, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = BusConfig::default();
        assert_eq!(config.capacity, 20);
        assert_eq!(config.poll_timeout, Duration::from_secs(10));
        assert_eq!(config.sleep_interval, Duration::from_millis(200));
        assert_eq!(config.store_key, "chat_messages");
        assert_eq!(config.stale_cursor, StaleCursorPolicy::Resync);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = BusConfig::from_lookup(lookup_from(&[
            ("POLLBUS_CAPACITY", "3"),
            ("POLLBUS_POLL_TIMEOUT_SECS", "1"),
            ("POLLBUS_SLEEP_INTERVAL_MS", "50"),
            ("POLLBUS_STORE_KEY", "lobby"),
            ("POLLBUS_STALE_CURSOR", "Reject"),
        ]))
        .unwrap();

        assert_eq!(config.capacity, 3);
        assert_eq!(config.poll_timeout, Duration::from_secs(1));
        assert_eq!(config.sleep_interval, Duration::from_millis(50));
        assert_eq!(config.store_key, "lobby");
        assert_eq!(config.stale_cursor, StaleCursorPolicy::Reject);
    }

    #[test]
    fn test_unparseable_env_value() {
        let err = BusConfig::from_lookup(lookup_from(&[("POLLBUS_CAPACITY", "lots")])).unwrap_err();
        assert!(matches!(err, BusError::Config(_)));
        assert!(err.to_string().contains("POLLBUS_CAPACITY"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = BusConfig::from_lookup(lookup_from(&[("POLLBUS_CAPACITY", "0")])).unwrap_err();
        assert!(matches!(err, BusError::Config(_)));
    }

    #[test]
    fn test_partial_override() {
        let config = BusConfig {
            capacity: 5,
            ..Default::default()
        };
        assert_eq!(config.capacity, 5);
        assert_eq!(config.poll_timeout, DEFAULT_POLL_TIMEOUT);
    }
}
