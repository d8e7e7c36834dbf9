//! # Runtime Configuration Module
//!
//! Environment-driven settings for the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `SWITCHYARD_SLOW_HANDLER_MS`
//!
//! Dispatches slower than this many milliseconds are logged at `WARN` with
//! their duration. Default: `100`.
//!
//! ### `SWITCHYARD_NOT_FOUND_BODY`
//!
//! Body sent with every `404` answer, whether no route matched or a handler
//! called `not_found()`. Default: `<h1>404</h1>`.
//!
//! ## Usage
//!
//! ```rust
//! use switchyard::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Slow handler threshold: {:?}", config.slow_handler_threshold);
//! ```

use std::env;
use std::time::Duration;

pub const DEFAULT_SLOW_HANDLER_MS: u64 = 100;
pub const DEFAULT_NOT_FOUND_BODY: &str = "<h1>404</h1>";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub slow_handler_threshold: Duration,
    pub not_found_body: String,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let slow_ms = lookup("SWITCHYARD_SLOW_HANDLER_MS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SLOW_HANDLER_MS);
        // An empty 404 body would break the non-empty-body guarantee.
        let not_found_body = lookup("SWITCHYARD_NOT_FOUND_BODY")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_NOT_FOUND_BODY.to_string());

        Self {
            slow_handler_threshold: Duration::from_millis(slow_ms),
            not_found_body,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_handler_threshold: Duration::from_millis(DEFAULT_SLOW_HANDLER_MS),
            not_found_body: DEFAULT_NOT_FOUND_BODY.to_string(),
        }
    }
}
