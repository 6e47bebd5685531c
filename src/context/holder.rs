use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use super::SecurityContext;
use crate::authentication::Authentication;

thread_local! {
    static CURRENT: RefCell<Option<SecurityContext>> = const { RefCell::new(None) };
}

/// Per-thread security context store.
///
/// The slot is never cleared automatically. Code that finishes a request on
/// a pooled thread must call [`clear_context`](Self::clear_context), or hold
/// a [`ContextGuard`] for the request's lifetime.
///
/// # Examples
///
/// ```
/// use access_core::{Authentication, SecurityContextHolder};
///
/// SecurityContextHolder::set_authentication(Authentication::new("user", "pw", ["ROLE_USER"]));
/// assert_eq!(SecurityContextHolder::authentication().map(|a| a.name().to_string()),
///            Some("user".to_string()));
///
/// SecurityContextHolder::clear_context();
/// assert!(SecurityContextHolder::get_context().is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SecurityContextHolder;

impl SecurityContextHolder {
    /// Returns a copy of this thread's context, if one is set.
    pub fn get_context() -> Option<SecurityContext> {
        CURRENT.with(|slot| slot.borrow().clone())
    }

    /// Returns this thread's current authentication, if any.
    pub fn authentication() -> Option<Authentication> {
        CURRENT.with(|slot| {
            slot.borrow()
                .as_ref()
                .and_then(|ctx| ctx.authentication().cloned())
        })
    }

    /// Replaces this thread's context.
    pub fn set_context(context: SecurityContext) {
        CURRENT.with(|slot| *slot.borrow_mut() = Some(context));
    }

    /// Replaces this thread's context with one holding `authentication`.
    pub fn set_authentication(authentication: Authentication) {
        Self::set_context(SecurityContext::new(authentication));
    }

    /// Empties this thread's slot.
    pub fn clear_context() {
        CURRENT.with(|slot| *slot.borrow_mut() = None);
    }

    /// Installs `context` until the returned guard is dropped.
    ///
    /// The previous slot value (possibly empty) comes back when the guard
    /// drops, including during unwinding. Guards must be dropped in reverse
    /// order of creation, which lexical scoping gives for free.
    pub fn enter(context: Option<SecurityContext>) -> ContextGuard {
        let previous = CURRENT.with(|slot| slot.replace(context));
        ContextGuard {
            previous: Some(previous),
            _not_send: PhantomData,
        }
    }
}

/// Restores the previous thread context when dropped.
///
/// Not `Send`: it must drop on the thread that created it.
#[must_use = "the previous context is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<Option<SecurityContext>>,
    _not_send: PhantomData<Rc<()>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            // try_with: the thread-local may already be gone during thread teardown
            let _ = CURRENT.try_with(|slot| *slot.borrow_mut() = previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Authentication {
        Authentication::new(name, "password", ["ROLE_USER"])
    }

    #[test]
    fn clear_then_get_is_empty() {
        SecurityContextHolder::set_authentication(user("a"));
        SecurityContextHolder::clear_context();
        assert!(SecurityContextHolder::get_context().is_none());

        SecurityContextHolder::clear_context();
        assert!(SecurityContextHolder::get_context().is_none());
    }

    #[test]
    fn guard_restores_previous_context() {
        SecurityContextHolder::set_authentication(user("outer"));
        {
            let _guard = SecurityContextHolder::enter(Some(SecurityContext::new(user("inner"))));
            assert_eq!(SecurityContextHolder::authentication().unwrap().name(), "inner");
        }
        assert_eq!(SecurityContextHolder::authentication().unwrap().name(), "outer");
        SecurityContextHolder::clear_context();
    }

    #[test]
    fn guard_restores_empty_slot() {
        SecurityContextHolder::clear_context();
        {
            let _guard = SecurityContextHolder::enter(Some(SecurityContext::new(user("inner"))));
            assert!(SecurityContextHolder::get_context().is_some());
        }
        assert!(SecurityContextHolder::get_context().is_none());
    }

    #[test]
    fn guard_restores_on_panic() {
        SecurityContextHolder::set_authentication(user("outer"));
        let result = std::panic::catch_unwind(|| {
            let _guard = SecurityContextHolder::enter(Some(SecurityContext::new(user("inner"))));
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(SecurityContextHolder::authentication().unwrap().name(), "outer");
        SecurityContextHolder::clear_context();
    }

    #[test]
    fn threads_do_not_share_slots() {
        SecurityContextHolder::set_authentication(user("main"));
        let seen = std::thread::spawn(SecurityContextHolder::get_context)
            .join()
            .unwrap();
        assert!(seen.is_none());
        SecurityContextHolder::clear_context();
    }
}
