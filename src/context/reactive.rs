use std::future::Future;

use super::SecurityContext;
use crate::authentication::Authentication;

tokio::task_local! {
    static CURRENT: Option<SecurityContext>;
}

/// Task-scoped security context store for async code.
///
/// A context written with [`with_context`](Self::with_context) is visible to
/// the wrapped future and everything it awaits, and to nothing else: sibling
/// tasks, spawned tasks and the caller keep whatever they had. Reads outside
/// any scope return `None`.
///
/// # Examples
///
/// ```
/// use access_core::{Authentication, ReactiveSecurityContextHolder};
///
/// # tokio_test_block(async {
/// let auth = Authentication::new("user", "password", ["ROLE_USER"]);
/// let name = ReactiveSecurityContextHolder::with_authentication(auth, async {
///     ReactiveSecurityContextHolder::authentication().map(|a| a.name().to_string())
/// })
/// .await;
///
/// assert_eq!(name.as_deref(), Some("user"));
/// assert!(ReactiveSecurityContextHolder::get_context().is_none());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReactiveSecurityContextHolder;

impl ReactiveSecurityContextHolder {
    /// Returns the context of the enclosing scope, if any.
    pub fn get_context() -> Option<SecurityContext> {
        CURRENT.try_with(Clone::clone).ok().flatten()
    }

    /// Returns the authentication of the enclosing scope, if any.
    pub fn authentication() -> Option<Authentication> {
        Self::get_context().and_then(SecurityContext::into_authentication)
    }

    /// Runs `future` with `context` as its security context.
    pub fn with_context<F: Future>(
        context: SecurityContext,
        future: F,
    ) -> impl Future<Output = F::Output> {
        CURRENT.scope(Some(context), future)
    }

    /// Runs `future` with a context holding `authentication`.
    pub fn with_authentication<F: Future>(
        authentication: Authentication,
        future: F,
    ) -> impl Future<Output = F::Output> {
        Self::with_context(SecurityContext::new(authentication), future)
    }

    /// Runs `future` with no security context, hiding any outer one.
    pub fn clear_context<F: Future>(future: F) -> impl Future<Output = F::Output> {
        CURRENT.scope(None, future)
    }

    /// Binds the current context to `future` so it survives `tokio::spawn`.
    ///
    /// Spawned tasks start with no context; call this at the spawn site to
    /// hand the caller's context over explicitly.
    pub fn propagate<F: Future>(future: F) -> impl Future<Output = F::Output> {
        CURRENT.scope(Self::get_context(), future)
    }
}
