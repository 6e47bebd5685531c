use std::fmt;

use crate::access::ConfigAttribute;
use crate::authentication::Authentication;
use crate::authority::GrantedAuthority;

/// How an authorization call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// Access was granted
    Granted,
    /// A policy refused access
    Denied,
    /// The decision could not be made
    Error,
}

impl fmt::Display for AuthorizationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationOutcome::Granted => write!(f, "granted"),
            AuthorizationOutcome::Denied => write!(f, "denied"),
            AuthorizationOutcome::Error => write!(f, "error"),
        }
    }
}

/// A record of one authorization decision.
///
/// # Example
///
/// ```
/// use access_core::{Authentication, AuthorizationObservation, AuthorizationOutcome, ConfigAttribute};
///
/// let user = Authentication::new("user", "pw", ["ROLE_USER"]);
/// let observation = AuthorizationObservation::new("GET /admin", AuthorizationOutcome::Denied)
///     .with_authentication(&user)
///     .with_attributes(&ConfigAttribute::list("ROLE_ADMIN"));
///
/// assert_eq!(observation.principal(), Some("user"));
/// assert_eq!(observation.outcome(), AuthorizationOutcome::Denied);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationObservation {
    object: String,
    outcome: AuthorizationOutcome,
    principal: Option<String>,
    authorities: Vec<GrantedAuthority>,
    attributes: Vec<ConfigAttribute>,
}

impl AuthorizationObservation {
    /// Creates an observation of a decision on `object`.
    pub fn new(object: impl Into<String>, outcome: AuthorizationOutcome) -> Self {
        Self {
            object: object.into(),
            outcome,
            principal: None,
            authorities: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Records the principal name and authorities, leaving credentials behind.
    pub fn with_authentication(mut self, authentication: &Authentication) -> Self {
        self.principal = authentication.principal().map(str::to_string);
        self.authorities = authentication.authorities().to_vec();
        self
    }

    /// Records the attributes that were decided on.
    pub fn with_attributes(mut self, attributes: &[ConfigAttribute]) -> Self {
        self.attributes = attributes.to_vec();
        self
    }

    /// Returns the description of the secured object.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuthorizationOutcome {
        self.outcome
    }

    /// Returns the principal name, if one was recorded.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the authorities observed at decision time.
    pub fn authorities(&self) -> &[GrantedAuthority] {
        &self.authorities
    }

    /// Returns the attributes decided on.
    pub fn attributes(&self) -> &[ConfigAttribute] {
        &self.attributes
    }
}

impl fmt::Display for AuthorizationObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Authorization[object={}, outcome={}, principal={}",
            self.object,
            self.outcome,
            self.principal.as_deref().unwrap_or("<none>")
        )?;
        if !self.attributes.is_empty() {
            let attributes: Vec<&str> = self.attributes.iter().map(|a| a.attribute()).collect();
            write!(f, ", attributes={}", attributes.join(","))?;
        }
        write!(f, "]")
    }
}
