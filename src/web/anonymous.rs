use std::future::Future;

use crate::authentication::Authentication;
use crate::context::{ReactiveSecurityContextHolder, SecurityContext, SecurityContextHolder};
use crate::error::Error;

/// Installs an anonymous authentication when nobody is logged in.
///
/// An existing authentication is never replaced.
///
/// # Examples
///
/// ```
/// use access_core::{AnonymousAuthenticationFilter, SecurityContextHolder};
///
/// let filter = AnonymousAuthenticationFilter::new("anon-key").unwrap();
/// assert!(filter.apply());
///
/// let anonymous = SecurityContextHolder::authentication().unwrap();
/// assert!(anonymous.is_anonymous());
/// assert_eq!(anonymous.name(), "anonymousUser");
/// SecurityContextHolder::clear_context();
/// ```
#[derive(Debug, Clone)]
pub struct AnonymousAuthenticationFilter {
    anonymous: Authentication,
}

impl AnonymousAuthenticationFilter {
    /// Creates a filter installing `anonymousUser` with `ROLE_ANONYMOUS`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` is empty.
    pub fn new(key: &str) -> Result<Self, Error> {
        Self::with_principal(key, "anonymousUser", ["ROLE_ANONYMOUS"])
    }

    /// Creates a filter with a custom principal and authorities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the key or principal is empty or
    /// no authority is given.
    pub fn with_principal<I, A>(key: &str, principal: impl Into<String>, authorities: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = A>,
        A: Into<crate::authority::GrantedAuthority>,
    {
        Ok(Self {
            anonymous: Authentication::anonymous(key, principal, authorities)?,
        })
    }

    /// Returns the anonymous authentication this filter installs.
    pub fn anonymous(&self) -> &Authentication {
        &self.anonymous
    }

    /// Returns `context` if it holds an authentication, the anonymous one otherwise.
    pub fn resolve(&self, context: Option<SecurityContext>) -> SecurityContext {
        match context {
            Some(context) if context.authentication().is_some() => context,
            _ => {
                tracing::trace!("Populated security context with anonymous authentication");
                SecurityContext::new(self.anonymous.clone())
            }
        }
    }

    /// Fills this thread's empty context; returns `true` if it did.
    pub fn apply(&self) -> bool {
        if SecurityContextHolder::authentication().is_some() {
            return false;
        }
        SecurityContextHolder::set_context(self.resolve(None));
        true
    }

    /// Runs `future` with the enclosing task context, or the anonymous one
    /// if the enclosing scope has no authentication.
    pub async fn filter_async<F: Future>(&self, future: F) -> F::Output {
        let context = self.resolve(ReactiveSecurityContextHolder::get_context());
        ReactiveSecurityContextHolder::with_context(context, future).await
    }
}
