use std::fmt;
use std::sync::Arc;

use super::ConfigAttribute;
use crate::authentication::Authentication;
use crate::authority::{GrantedAuthority, RoleHierarchy};

/// A single voter's opinion on an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// The voter grants access
    Granted,
    /// The voter has no opinion on these attributes
    Abstain,
    /// The voter denies access
    Denied,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Granted => write!(f, "granted"),
            Vote::Abstain => write!(f, "abstain"),
            Vote::Denied => write!(f, "denied"),
        }
    }
}

/// Votes on whether an authentication may access a secured object of type `O`.
pub trait AccessDecisionVoter<O: ?Sized>: Send + Sync {
    /// Returns `true` if this voter understands `attribute`.
    fn supports(&self, attribute: &ConfigAttribute) -> bool;

    /// Casts a vote; voters abstain when none of `attributes` is supported.
    fn vote(&self, authentication: &Authentication, object: &O, attributes: &[ConfigAttribute]) -> Vote;
}

/// Grants access when the authentication holds a role named by an attribute.
///
/// Only attributes starting with the role prefix (`ROLE_` by default) are
/// considered. If any such attribute matches a granted authority the vote
/// is [`Vote::Granted`]; if some were considered and none matched it is
/// [`Vote::Denied`]; otherwise [`Vote::Abstain`].
#[derive(Debug, Clone)]
pub struct RoleVoter {
    prefix: String,
}

impl RoleVoter {
    /// Creates a voter using the `ROLE_` prefix.
    pub fn new() -> Self {
        Self::with_prefix("ROLE_")
    }

    /// Creates a voter using a custom prefix; an empty prefix supports every attribute.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn supports_attribute(&self, attribute: &ConfigAttribute) -> bool {
        attribute.attribute().starts_with(&self.prefix)
    }

    fn vote_on(&self, authorities: &[GrantedAuthority], attributes: &[ConfigAttribute]) -> Vote {
        let mut result = Vote::Abstain;
        for attribute in attributes.iter().filter(|a| self.supports_attribute(a)) {
            result = Vote::Denied;
            if authorities.iter().any(|a| a.authority() == attribute.attribute()) {
                return Vote::Granted;
            }
        }
        result
    }
}

impl Default for RoleVoter {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized> AccessDecisionVoter<O> for RoleVoter {
    fn supports(&self, attribute: &ConfigAttribute) -> bool {
        self.supports_attribute(attribute)
    }

    fn vote(&self, authentication: &Authentication, _object: &O, attributes: &[ConfigAttribute]) -> Vote {
        self.vote_on(authentication.authorities(), attributes)
    }
}

/// A [`RoleVoter`] that first expands authorities through a role hierarchy.
#[derive(Debug, Clone)]
pub struct RoleHierarchyVoter {
    role_voter: RoleVoter,
    role_hierarchy: Arc<dyn RoleHierarchy>,
}

impl RoleHierarchyVoter {
    /// Creates a voter over `role_hierarchy` with the `ROLE_` prefix.
    pub fn new(role_hierarchy: Arc<dyn RoleHierarchy>) -> Self {
        Self {
            role_voter: RoleVoter::new(),
            role_hierarchy,
        }
    }
}

impl<O: ?Sized> AccessDecisionVoter<O> for RoleHierarchyVoter {
    fn supports(&self, attribute: &ConfigAttribute) -> bool {
        self.role_voter.supports_attribute(attribute)
    }

    fn vote(&self, authentication: &Authentication, _object: &O, attributes: &[ConfigAttribute]) -> Vote {
        let reachable = self
            .role_hierarchy
            .reachable_authorities(authentication.authorities());
        self.role_voter.vote_on(&reachable, attributes)
    }
}

/// Votes on how strongly the caller is authenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedVoter;

impl AuthenticatedVoter {
    /// Requires a non-anonymous, authenticated principal.
    pub const IS_AUTHENTICATED_FULLY: &'static str = "IS_AUTHENTICATED_FULLY";
    /// Accepts any authenticated or anonymous principal.
    pub const IS_AUTHENTICATED_ANONYMOUSLY: &'static str = "IS_AUTHENTICATED_ANONYMOUSLY";
    /// Requires an anonymous principal.
    pub const IS_ANONYMOUS: &'static str = "IS_ANONYMOUS";

    fn is_granted(attribute: &str, authentication: &Authentication) -> bool {
        match attribute {
            Self::IS_AUTHENTICATED_FULLY => {
                authentication.is_authenticated() && !authentication.is_anonymous()
            }
            Self::IS_AUTHENTICATED_ANONYMOUSLY => {
                authentication.is_authenticated() || authentication.is_anonymous()
            }
            Self::IS_ANONYMOUS => authentication.is_anonymous(),
            _ => false,
        }
    }
}

impl<O: ?Sized> AccessDecisionVoter<O> for AuthenticatedVoter {
    fn supports(&self, attribute: &ConfigAttribute) -> bool {
        matches!(
            attribute.attribute(),
            Self::IS_AUTHENTICATED_FULLY | Self::IS_AUTHENTICATED_ANONYMOUSLY | Self::IS_ANONYMOUS
        )
    }

    fn vote(&self, authentication: &Authentication, _object: &O, attributes: &[ConfigAttribute]) -> Vote {
        let mut result = Vote::Abstain;
        for attribute in attributes {
            if !AccessDecisionVoter::<O>::supports(self, attribute) {
                continue;
            }
            result = Vote::Denied;
            if Self::is_granted(attribute.attribute(), authentication) {
                return Vote::Granted;
            }
        }
        result
    }
}
