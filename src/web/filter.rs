use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::{AnonymousAuthenticationFilter, FilterInvocation, SecurityContextRepository};
use crate::context::{ReactiveSecurityContextHolder, SecurityContextHolder};
use crate::error::Error;
use crate::intercept::SecurityInterceptor;

/// Runs a request through context loading, anonymous fallback,
/// authorization and context saving.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use access_core::{
///     AffirmativeBased, AntPathRequestMatcher, AuthenticatedVoter, ConfigAttribute, Error,
///     FilterInvocation, RequestMatcherMetadataSource, RoleVoter, SecurityFilterChain,
///     SecurityInterceptor, SessionSecurityContextRepository,
/// };
///
/// let metadata = RequestMatcherMetadataSource::new().rule(
///     Arc::new(AntPathRequestMatcher::new("/admin/**").unwrap()),
///     ConfigAttribute::list("ROLE_ADMIN"),
/// );
/// let manager = AffirmativeBased::<FilterInvocation>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
/// let interceptor = SecurityInterceptor::<FilterInvocation>::new(Arc::new(metadata), Arc::new(manager));
/// let chain = SecurityFilterChain::new(
///     Arc::new(interceptor),
///     Arc::new(SessionSecurityContextRepository::new()),
/// );
///
/// let home = chain.do_filter(&FilterInvocation::new("/home"), |_| Ok::<_, Error>("home"));
/// assert_eq!(home.unwrap(), "home");
///
/// let admin = chain.do_filter(&FilterInvocation::new("/admin"), |_| Ok::<_, Error>("admin"));
/// assert!(admin.is_err());
/// ```
pub struct SecurityFilterChain {
    interceptor: Arc<SecurityInterceptor<FilterInvocation>>,
    repository: Arc<dyn SecurityContextRepository>,
    anonymous: Option<AnonymousAuthenticationFilter>,
}

impl SecurityFilterChain {
    /// Creates a chain without anonymous fallback.
    pub fn new(
        interceptor: Arc<SecurityInterceptor<FilterInvocation>>,
        repository: Arc<dyn SecurityContextRepository>,
    ) -> Self {
        Self {
            interceptor,
            repository,
            anonymous: None,
        }
    }

    /// Installs an anonymous authentication for requests nobody is logged in to.
    pub fn anonymous(mut self, filter: AnonymousAuthenticationFilter) -> Self {
        self.anonymous = Some(filter);
        self
    }

    /// Returns the interceptor guarding this chain.
    pub fn interceptor(&self) -> &Arc<SecurityInterceptor<FilterInvocation>> {
        &self.interceptor
    }

    /// Handles one request on the current thread.
    ///
    /// The handler may change the thread's context (for example after a
    /// login); whatever context is current when it returns is saved. The
    /// thread's slot is returned to its previous state, normally empty, on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Authorization errors, converted into `E`, or whatever `handler` returns.
    pub fn do_filter<T, E, F>(&self, invocation: &FilterInvocation, handler: F) -> Result<T, E>
    where
        E: From<Error>,
        F: FnOnce(&FilterInvocation) -> Result<T, E>,
    {
        let loaded = self.repository.load_context(invocation);
        let _restore = SecurityContextHolder::enter(loaded);
        if let Some(anonymous) = &self.anonymous {
            anonymous.apply();
        }

        let result = self.interceptor.invoke(invocation, || handler(invocation));

        self.repository
            .save_context(SecurityContextHolder::get_context().as_ref(), invocation);
        result
    }

    /// Handles one request inside the current task.
    ///
    /// The loaded context is scoped to `handler`'s future. Task contexts are
    /// immutable, so a handler that establishes a new identity saves it
    /// through the repository itself.
    ///
    /// # Errors
    ///
    /// Authorization errors, converted into `E`, or whatever `handler` returns.
    pub async fn do_filter_async<T, E, F, Fut>(&self, invocation: &FilterInvocation, handler: F) -> Result<T, E>
    where
        E: From<Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let loaded = self.repository.load_context(invocation);
        let context = match &self.anonymous {
            Some(anonymous) => Some(anonymous.resolve(loaded)),
            None => loaded,
        };

        let request = async {
            let result = self.interceptor.invoke_async(invocation, handler()).await;
            self.repository
                .save_context(ReactiveSecurityContextHolder::get_context().as_ref(), invocation);
            result
        };
        match context {
            Some(context) => ReactiveSecurityContextHolder::with_context(context, request).await,
            None => ReactiveSecurityContextHolder::clear_context(request).await,
        }
    }
}

impl fmt::Debug for SecurityFilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityFilterChain")
            .field("interceptor", &self.interceptor)
            .field("anonymous", &self.anonymous.is_some())
            .finish_non_exhaustive()
    }
}
