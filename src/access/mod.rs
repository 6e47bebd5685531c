//! Access-control building blocks: attributes, voters, decision managers,
//! run-as substitution, metadata sources and permission evaluation.

mod decision;
mod metadata;
mod permission;
mod run_as;
mod vote;

use std::fmt;

pub use decision::{AccessDecisionManager, AffirmativeBased, ConsensusBased, UnanimousBased};
pub use metadata::{MapSecurityMetadataSource, SecurityMetadataSource};
pub use permission::{DenyAllPermissionEvaluator, PermissionEvaluator};
pub use run_as::{NullRunAsManager, RunAsManager, RunAsManagerImpl, RUN_AS_PREFIX};
pub use vote::{AccessDecisionVoter, AuthenticatedVoter, RoleHierarchyVoter, RoleVoter, Vote};

/// A token describing what is required to access a secured object,
/// such as `ROLE_ADMIN` or `IS_AUTHENTICATED_FULLY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigAttribute(String);

impl ConfigAttribute {
    /// Creates an attribute.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self(attribute.into())
    }

    /// Returns the attribute string.
    pub fn attribute(&self) -> &str {
        &self.0
    }

    /// Splits a comma-delimited list into attributes, keeping order.
    ///
    /// # Examples
    ///
    /// ```
    /// use access_core::ConfigAttribute;
    ///
    /// let attrs = ConfigAttribute::list("ROLE_A, ROLE_B");
    /// assert_eq!(attrs, vec![ConfigAttribute::new("ROLE_A"), ConfigAttribute::new("ROLE_B")]);
    /// ```
    pub fn list(value: &str) -> Vec<ConfigAttribute> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ConfigAttribute::new)
            .collect()
    }
}

impl fmt::Display for ConfigAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigAttribute {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConfigAttribute {
    fn from(value: String) -> Self {
        Self(value)
    }
}
