//! Rule configuration DTOs
//!
//! Defines the JSON shape of cache rules supplied through configuration.

use std::time::Duration;

use http::Method;
use serde::Deserialize;

use crate::caller::CacheRule;

/// One cache rule as written in configuration:
///
/// ```json
/// {"pattern": "/foo/[0-9]+", "regex": true, "methods": ["GET"], "expiry_ms": 500}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    /// Literal path, or regular expression source when `regex` is set
    pub pattern: String,
    #[serde(default)]
    pub regex: bool,
    /// Method names; empty = all methods
    #[serde(default)]
    pub methods: Vec<String>,
    /// Expiry override in milliseconds
    #[serde(default)]
    pub expiry_ms: Option<u64>,
}

impl RuleSpec {
    /// Validates the rule data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Rule pattern cannot be empty".to_string());
        }
        if let Some(method) = self.methods.iter().find(|m| parse_method(m).is_none()) {
            return Some(format!("Invalid HTTP method '{}'", method));
        }
        None
    }

    /// Converts the rule data into a [`CacheRule`]. Unknown methods are skipped; call
    /// [`RuleSpec::validate`] first to reject them.
    pub fn into_rule(self) -> CacheRule {
        let rule = if self.regex {
            CacheRule::regex(self.pattern)
        } else {
            CacheRule::path(self.pattern)
        };
        let rule = rule.with_methods(self.methods.iter().filter_map(|m| parse_method(m)));
        match self.expiry_ms {
            Some(ms) => rule.with_expiry(Duration::from_millis(ms)),
            None => rule,
        }
    }
}

fn parse_method(name: &str) -> Option<Method> {
    Method::from_bytes(name.to_ascii_uppercase().as_bytes()).ok()
}
