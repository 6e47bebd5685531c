//! Security context and the stores that carry it through a request.
//!
//! Two stores exist side by side:
//! - [`SecurityContextHolder`]: a per-thread slot for thread-per-request
//!   code. Callers clear it when the request ends, or use the scoped
//!   [`ContextGuard`] returned by [`SecurityContextHolder::enter`].
//! - [`ReactiveSecurityContextHolder`]: a tokio task-local value scoped to
//!   one future. Nothing global is mutated, so nothing can leak.
//!
//! Work handed to pooled threads must carry its context explicitly, see
//! [`DelegatingSecurityContextTask`] and [`DelegatingSecurityContextExecutor`].

mod holder;
mod propagation;
mod reactive;

use crate::authentication::Authentication;

pub use holder::{ContextGuard, SecurityContextHolder};
pub use propagation::{
    DelegatingSecurityContextExecutor, DelegatingSecurityContextTask, SchedulingTaskExecutor,
    Task, TaskExecutor,
};
pub use reactive::ReactiveSecurityContextHolder;

/// Holds at most one [`Authentication`] for the duration of a request.
///
/// # Examples
///
/// ```
/// use access_core::{Authentication, SecurityContext};
///
/// let mut context = SecurityContext::empty();
/// assert!(context.authentication().is_none());
///
/// context.set_authentication(Some(Authentication::new("user", "password", ["ROLE_USER"])));
/// assert_eq!(context.authentication().map(|a| a.name()), Some("user"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// Creates a context holding `authentication`.
    pub fn new(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    /// Creates a context with no authentication.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the current authentication.
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Replaces the current authentication.
    pub fn set_authentication(&mut self, authentication: Option<Authentication>) {
        self.authentication = authentication;
    }

    /// Takes the authentication out, leaving the context empty.
    pub fn into_authentication(self) -> Option<Authentication> {
        self.authentication
    }
}

impl From<Authentication> for SecurityContext {
    fn from(authentication: Authentication) -> Self {
        Self::new(authentication)
    }
}
