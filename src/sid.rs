//! Security identities derived from an authentication.

use std::fmt;
use std::sync::Arc;

use crate::authentication::Authentication;
use crate::authority::RoleHierarchy;

/// A security identity that permissions can be granted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sid {
    /// The authenticated principal itself, by name
    Principal(String),
    /// One granted authority
    GrantedAuthority(String),
}

impl Sid {
    /// Returns the principal name for principal SIDs.
    pub fn principal(&self) -> Option<&str> {
        match self {
            Sid::Principal(name) => Some(name),
            Sid::GrantedAuthority(_) => None,
        }
    }

    /// Returns the authority for authority SIDs.
    pub fn granted_authority(&self) -> Option<&str> {
        match self {
            Sid::GrantedAuthority(authority) => Some(authority),
            Sid::Principal(_) => None,
        }
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sid::Principal(name) => write!(f, "PrincipalSid[{}]", name),
            Sid::GrantedAuthority(authority) => write!(f, "GrantedAuthoritySid[{}]", authority),
        }
    }
}

/// Maps an authentication to the ordered identities it may act as.
pub trait SidRetrievalStrategy: Send + Sync {
    /// Returns the principal SID first (when present), then authority SIDs.
    fn get_sids(&self, authentication: &Authentication) -> Vec<Sid>;
}

/// The standard strategy, optionally expanding authorities through a role hierarchy.
///
/// # Examples
///
/// ```
/// use access_core::{Authentication, DefaultSidRetrievalStrategy, Sid, SidRetrievalStrategy};
///
/// let auth = Authentication::new("scott", "password", ["A", "B"]);
/// let sids = DefaultSidRetrievalStrategy::new().get_sids(&auth);
///
/// assert_eq!(sids[0], Sid::Principal("scott".to_string()));
/// assert_eq!(sids[2], Sid::GrantedAuthority("B".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultSidRetrievalStrategy {
    role_hierarchy: Option<Arc<dyn RoleHierarchy>>,
}

impl DefaultSidRetrievalStrategy {
    /// Creates a strategy that uses the raw authorities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strategy that expands authorities through `role_hierarchy`.
    pub fn with_role_hierarchy(role_hierarchy: Arc<dyn RoleHierarchy>) -> Self {
        Self {
            role_hierarchy: Some(role_hierarchy),
        }
    }
}

impl SidRetrievalStrategy for DefaultSidRetrievalStrategy {
    fn get_sids(&self, authentication: &Authentication) -> Vec<Sid> {
        let expanded;
        let authorities = match &self.role_hierarchy {
            Some(hierarchy) => {
                expanded = hierarchy.reachable_authorities(authentication.authorities());
                expanded.as_slice()
            }
            None => authentication.authorities(),
        };

        let mut sids = Vec::with_capacity(authorities.len() + 1);
        if let Some(principal) = authentication.principal() {
            sids.push(Sid::Principal(principal.to_string()));
        }
        sids.extend(
            authorities
                .iter()
                .map(|a| Sid::GrantedAuthority(a.authority().to_string())),
        );
        sids
    }
}
