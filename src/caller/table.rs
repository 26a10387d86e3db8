//! Cache Table
//!
//! Ordered rules deciding which requests are cached, and for how long.

use std::sync::OnceLock;
use std::time::Duration;

use http::Method;
use regex::Regex;

use super::ApiRequest;
use crate::error::{CallerError, Result};

// == Cache Rule ==
/// One entry of a [`CacheTable`].
///
/// A rule matches a request when its method filter allows the request's method
/// and its pattern matches the request path: literal equality, or a full match
/// of the regular expression when `is_regex` is set.
#[derive(Debug, Clone)]
pub struct CacheRule {
    pattern: String,
    is_regex: bool,
    /// Empty = all methods
    methods: Vec<Method>,
    /// None or zero = the table's default expiry
    expiry: Option<Duration>,
    compiled: OnceLock<Regex>,
}

impl CacheRule {
    /// A rule matching `path` exactly.
    pub fn path(path: impl Into<String>) -> Self {
        Self::new(path, false)
    }

    /// A rule matching paths against a regular expression.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::new(pattern, true)
    }

    fn new(pattern: impl Into<String>, is_regex: bool) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex,
            methods: Vec::new(),
            expiry: None,
            compiled: OnceLock::new(),
        }
    }

    /// Restricts the rule to the given methods.
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Overrides the table's default expiry for requests matching this rule.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_regex(&self) -> bool {
        self.is_regex
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn expiry(&self) -> Option<Duration> {
        self.expiry.filter(|expiry| !expiry.is_zero())
    }

    /// Returns true once the rule's regular expression has been compiled.
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Compiles the regular expression now, reporting an invalid pattern as an error.
    pub fn compile(&self) -> Result<()> {
        if !self.is_regex || self.compiled.get().is_some() {
            return Ok(());
        }
        let regex = build_regex(&self.pattern)?;
        // Another task may have won the race; both compiled the same source
        let _ = self.compiled.set(regex);
        Ok(())
    }

    /// Checks the rule against a request's method and path.
    ///
    /// # Panics
    /// Panics if the rule's regular expression does not compile. A malformed
    /// table is a configuration bug; use [`CacheTable::compile`] to catch it
    /// at startup instead.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if !self.methods.is_empty() && !self.methods.contains(method) {
            return false;
        }
        if !self.is_regex {
            return self.pattern == path;
        }
        self.compiled
            .get_or_init(|| {
                build_regex(&self.pattern).unwrap_or_else(|err| panic!("{}", err))
            })
            .is_match(path)
    }
}

/// Anchors the pattern so it must match the whole path.
fn build_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| CallerError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// == Cache Table ==
/// Ordered list of [`CacheRule`]s; the first matching rule wins.
///
/// An empty table caches every request.
#[derive(Debug, Clone, Default)]
pub struct CacheTable {
    rules: Vec<CacheRule>,
    default_expiry: Duration,
}

impl CacheTable {
    pub fn new(rules: Vec<CacheRule>, default_expiry: Duration) -> Self {
        Self {
            rules,
            default_expiry,
        }
    }

    pub fn rules(&self) -> &[CacheRule] {
        &self.rules
    }

    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    /// Compiles every regular expression rule, failing on the first invalid pattern.
    pub fn compile(&self) -> Result<()> {
        self.rules.iter().try_for_each(CacheRule::compile)
    }

    // == Classify ==
    /// Decides whether a request should be cached.
    ///
    /// Returns `Some(expiry)` for a cacheable request: the matching rule's
    /// override, or the table's default. Returns `None` when the table has
    /// rules and none matches.
    ///
    /// # Panics
    /// Panics if a regular expression rule reached during evaluation does not compile.
    pub fn classify(&self, method: &Method, path: &str) -> Option<Duration> {
        if self.rules.is_empty() {
            return Some(self.default_expiry);
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.expiry().unwrap_or(self.default_expiry))
    }

    pub fn should_cache(&self, request: &ApiRequest) -> Option<Duration> {
        self.classify(request.method(), request.uri().path())
    }
}
