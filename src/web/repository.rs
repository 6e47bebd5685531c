use std::collections::HashMap;

use parking_lot::RwLock;

use super::FilterInvocation;
use crate::context::SecurityContext;

/// Persists security contexts between requests.
pub trait SecurityContextRepository: Send + Sync {
    /// Loads the context saved for the request's client, if any.
    fn load_context(&self, invocation: &FilterInvocation) -> Option<SecurityContext>;

    /// Saves the context at the end of a request; `None` forgets it.
    fn save_context(&self, context: Option<&SecurityContext>, invocation: &FilterInvocation);

    /// Returns `true` if a context is stored for the request's client.
    fn contains_context(&self, invocation: &FilterInvocation) -> bool;
}

/// In-memory repository keyed by session identifier.
///
/// Follows servlet session semantics rather than reactive ones: only a
/// context holding a non-anonymous authentication is written to the
/// session. Saving an empty or anonymous context removes whatever the
/// session held, so a logout clears it. Requests without a session are
/// never persisted.
#[derive(Debug, Default)]
pub struct SessionSecurityContextRepository {
    sessions: RwLock<HashMap<String, SecurityContext>>,
}

impl SessionSecurityContextRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the context stored for `session_id`.
    pub fn invalidate(&self, session_id: &str) {
        self.sessions.write().remove(session_id);
    }

    /// Returns the number of sessions holding a context.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` when no session holds a context.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl SecurityContextRepository for SessionSecurityContextRepository {
    fn load_context(&self, invocation: &FilterInvocation) -> Option<SecurityContext> {
        let session_id = invocation.session_id()?;
        self.sessions.read().get(session_id).cloned()
    }

    fn save_context(&self, context: Option<&SecurityContext>, invocation: &FilterInvocation) {
        let Some(session_id) = invocation.session_id() else {
            return;
        };
        let storable = context.filter(|ctx| {
            ctx.authentication()
                .is_some_and(|authentication| !authentication.is_anonymous())
        });
        match storable {
            Some(context) => {
                self.sessions
                    .write()
                    .insert(session_id.to_string(), context.clone());
            }
            None => {
                if self.sessions.write().remove(session_id).is_some() {
                    tracing::debug!(session_id, "Removed security context from session");
                }
            }
        }
    }

    fn contains_context(&self, invocation: &FilterInvocation) -> bool {
        invocation
            .session_id()
            .is_some_and(|id| self.sessions.read().contains_key(id))
    }
}
