//! Configuration Module
//!
//! Handles loading the caching client's configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::caller::{CacheRule, CacheTable};
use crate::error::{CallerError, Result};
use crate::models::RuleSpec;
use crate::server::DEFAULT_SHUTDOWN_TIMEOUT;

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application label attached to every client metric
    pub application: String,
    /// Expiry for cached responses whose rule sets none
    pub default_expiry: Duration,
    /// Interval between background sweeps of expired entries (zero = no sweep)
    pub cleanup_interval: Duration,
    /// Port of the metrics scrape server (0 = any free port)
    pub metrics_port: u16,
    /// URL polled through the cache, if any
    pub target_url: Option<String>,
    /// Interval between polls of `target_url`
    pub poll_interval: Duration,
    /// Upper bound on draining open connections at shutdown
    pub shutdown_timeout: Duration,
    /// Cache rules, in match order (empty = cache everything)
    pub rules: Vec<RuleSpec>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `APPLICATION` - Metrics application label (default: api_cacher)
    /// - `CACHE_EXPIRY_MS` - Default cache expiry in milliseconds (default: 300000)
    /// - `CACHE_CLEANUP_MS` - Sweep interval in milliseconds, 0 disables (default: 1000)
    /// - `METRICS_PORT` - Metrics server port (default: 9090)
    /// - `TARGET_URL` - URL to poll through the cache (default: unset)
    /// - `POLL_INTERVAL_MS` - Poll interval in milliseconds, must be non-zero (default: 10000)
    /// - `SHUTDOWN_TIMEOUT_MS` - Connection drain bound at shutdown (default: 5000)
    /// - `CACHE_RULES` - JSON array of rules (default: empty)
    ///
    /// Malformed `CACHE_RULES` is an error; other unparsable values fall back
    /// to their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let rules = match env::var("CACHE_RULES") {
            Ok(json) if !json.trim().is_empty() => parse_rules(&json)?,
            _ => Vec::new(),
        };

        Ok(Self {
            application: env::var("APPLICATION").unwrap_or(defaults.application),
            default_expiry: env_millis("CACHE_EXPIRY_MS").unwrap_or(defaults.default_expiry),
            cleanup_interval: env_millis("CACHE_CLEANUP_MS").unwrap_or(defaults.cleanup_interval),
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_port),
            target_url: env::var("TARGET_URL").ok().filter(|url| !url.is_empty()),
            poll_interval: env_millis("POLL_INTERVAL_MS")
                .filter(|interval| !interval.is_zero())
                .unwrap_or(defaults.poll_interval),
            shutdown_timeout: env_millis("SHUTDOWN_TIMEOUT_MS").unwrap_or(defaults.shutdown_timeout),
            rules,
        })
    }

    /// Builds the rule list in configured order.
    pub fn cache_rules(&self) -> Vec<CacheRule> {
        self.rules.iter().cloned().map(RuleSpec::into_rule).collect()
    }

    /// Builds the cache table and compiles its regular expressions.
    pub fn cache_table(&self) -> Result<CacheTable> {
        let table = CacheTable::new(self.cache_rules(), self.default_expiry);
        table.compile()?;
        Ok(table)
    }
}

/// Parses and validates a JSON array of rules.
pub fn parse_rules(json: &str) -> Result<Vec<RuleSpec>> {
    let rules: Vec<RuleSpec> = serde_json::from_str(json)
        .map_err(|e| CallerError::Config(format!("CACHE_RULES: {}", e)))?;

    for (index, rule) in rules.iter().enumerate() {
        if let Some(message) = rule.validate() {
            return Err(CallerError::Config(format!("CACHE_RULES[{}]: {}", index, message)));
        }
    }
    Ok(rules)
}

fn env_millis(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application: "api_cacher".to_string(),
            default_expiry: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(1),
            metrics_port: 9090,
            target_url: None,
            poll_interval: Duration::from_secs(10),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            rules: Vec::new(),
        }
    }
}
