use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::FilterInvocation;
use crate::access::{ConfigAttribute, SecurityMetadataSource};
use crate::error::Error;

/// Decides whether a rule applies to a request.
pub trait RequestMatcher: Send + Sync + fmt::Debug {
    /// Returns `true` if `invocation` matches.
    fn matches(&self, invocation: &FilterInvocation) -> bool;
}

/// Matches every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyRequestMatcher;

impl RequestMatcher for AnyRequestMatcher {
    fn matches(&self, _: &FilterInvocation) -> bool {
        true
    }
}

/// Matches the request URL against an Ant-style pattern.
///
/// - `?` matches one character other than `/`
/// - `*` matches zero or more characters within a path segment
/// - `**` matches across segments
/// - a trailing `/**` also matches the bare prefix, so `/admin/**` matches
///   `/admin` as well as `/admin/users/1`
///
/// Matching is case-sensitive and ignores the query string.
///
/// # Examples
///
/// ```
/// use access_core::{AntPathRequestMatcher, FilterInvocation, RequestMatcher};
///
/// let matcher = AntPathRequestMatcher::new("/admin/**").unwrap();
/// assert!(matcher.matches(&FilterInvocation::new("/admin")));
/// assert!(matcher.matches(&FilterInvocation::new("/admin/users/1?sort=asc")));
/// assert!(!matcher.matches(&FilterInvocation::new("/administrator")));
/// ```
#[derive(Debug, Clone)]
pub struct AntPathRequestMatcher {
    pattern: String,
    method: Option<String>,
    regex: Regex,
}

impl AntPathRequestMatcher {
    /// Creates a matcher for any HTTP method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty pattern.
    pub fn new(pattern: impl Into<String>) -> Result<Self, Error> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(Error::invalid_argument("Pattern cannot be empty"));
        }
        let regex = Regex::new(&ant_to_regex(&pattern))
            .map_err(|e| Error::invalid_argument(format!("Invalid pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            pattern,
            method: None,
            regex,
        })
    }

    /// Creates a matcher restricted to one HTTP method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty pattern.
    pub fn with_method(pattern: impl Into<String>, method: &str) -> Result<Self, Error> {
        let mut matcher = Self::new(pattern)?;
        matcher.method = Some(method.to_ascii_uppercase());
        Ok(matcher)
    }

    /// Returns the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl RequestMatcher for AntPathRequestMatcher {
    fn matches(&self, invocation: &FilterInvocation) -> bool {
        if let Some(method) = &self.method {
            if method != invocation.method() {
                return false;
            }
        }
        self.regex.is_match(invocation.request_url())
    }
}

fn ant_to_regex(pattern: &str) -> String {
    let (body, suffix) = match pattern.strip_suffix("/**") {
        Some(body) => (body, "(/.*)?"),
        None => (pattern, ""),
    };

    let mut regex = String::from("^");
    let mut rest = body;
    while let Some(c) = rest.chars().next() {
        // `/**/` spans zero or more whole directories; the closing slash stays in `rest`
        if rest.starts_with("/**/") {
            regex.push_str("(?:/.*)?");
            rest = &rest[3..];
            continue;
        }
        if rest.starts_with("**") {
            regex.push_str(".*");
            rest = &rest[2..];
            continue;
        }
        match c {
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
        rest = &rest[c.len_utf8()..];
    }
    regex.push_str(suffix);
    regex.push('$');
    regex
}

/// Maps requests to attributes through an ordered list of matchers.
///
/// The first matching rule wins, so specific patterns go before broad ones.
#[derive(Debug, Clone, Default)]
pub struct RequestMatcherMetadataSource {
    rules: Vec<(Arc<dyn RequestMatcher>, Vec<ConfigAttribute>)>,
}

impl RequestMatcherMetadataSource {
    /// Creates a source with no rules; every request is public.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    pub fn rule(mut self, matcher: Arc<dyn RequestMatcher>, attributes: Vec<ConfigAttribute>) -> Self {
        self.rules.push((matcher, attributes));
        self
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl SecurityMetadataSource<FilterInvocation> for RequestMatcherMetadataSource {
    fn attributes(&self, invocation: &FilterInvocation) -> Option<Vec<ConfigAttribute>> {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(invocation))
            .map(|(_, attributes)| attributes.clone())
    }

    fn all_attributes(&self) -> Vec<ConfigAttribute> {
        let mut all: Vec<ConfigAttribute> = Vec::new();
        for attribute in self.rules.iter().flat_map(|(_, attributes)| attributes) {
            if !all.contains(attribute) {
                all.push(attribute.clone());
            }
        }
        all
    }
}
