//! Target address configuration.
//!
//! # Design
//! The address is an explicit value handed to every execution call instead
//! of process-wide state, so concurrently running test binaries or threads
//! can point at different servers without stepping on each other.

use serde::Deserialize;

pub const DEFAULT_ADDR: &str = "localhost:3456";

/// Environment variable consulted by `Config::from_env`.
pub const ADDR_ENV: &str = "HIT_ADDR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `host:port` the requests are sent to.
    pub addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// The default configuration, with the address overridden by
    /// `HIT_ADDR` when that variable is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(ADDR_ENV) {
            Ok(addr) if !addr.trim().is_empty() => Self::new(addr.trim()),
            _ => Self::default(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}
