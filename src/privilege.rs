//! "Would this request be allowed?" checks for rendering decisions.

use std::sync::Arc;

use crate::authentication::Authentication;
use crate::error::Error;
use crate::intercept::SecurityInterceptor;
use crate::web::FilterInvocation;

/// Evaluates whether a principal could access a web resource, without
/// invoking it.
pub trait WebInvocationPrivilegeEvaluator: Send + Sync {
    /// Checks `uri` for a `GET` request in the root context.
    ///
    /// # Errors
    ///
    /// Decision failures other than a denial.
    fn is_allowed(&self, uri: &str, authentication: Option<&Authentication>) -> Result<bool, Error> {
        self.is_allowed_with("", uri, None, authentication)
    }

    /// Checks `uri` under `context_path` for `method` (`GET` when `None`).
    ///
    /// # Errors
    ///
    /// Decision failures other than a denial.
    fn is_allowed_with(
        &self,
        context_path: &str,
        uri: &str,
        method: Option<&str>,
        authentication: Option<&Authentication>,
    ) -> Result<bool, Error>;
}

/// Asks the web [`SecurityInterceptor`] about a synthesized request.
///
/// A missing authentication is never allowed. A denial is reported as
/// `false`; any other failure is returned as an error.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use access_core::{
///     AffirmativeBased, AntPathRequestMatcher, Authentication, ConfigAttribute,
///     DefaultWebInvocationPrivilegeEvaluator, FilterInvocation, RequestMatcherMetadataSource,
///     RoleVoter, SecurityInterceptor, WebInvocationPrivilegeEvaluator,
/// };
///
/// let metadata = RequestMatcherMetadataSource::new().rule(
///     Arc::new(AntPathRequestMatcher::new("/admin/**").unwrap()),
///     ConfigAttribute::list("ROLE_ADMIN"),
/// );
/// let manager = AffirmativeBased::<FilterInvocation>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
/// let interceptor = SecurityInterceptor::<FilterInvocation>::new(Arc::new(metadata), Arc::new(manager));
/// let evaluator = DefaultWebInvocationPrivilegeEvaluator::new(Arc::new(interceptor));
///
/// let user = Authentication::new("user", "pw", ["ROLE_USER"]);
/// assert!(!evaluator.is_allowed("/admin/panel", Some(&user)).unwrap());
/// assert!(evaluator.is_allowed("/home", Some(&user)).unwrap());
/// assert!(!evaluator.is_allowed("/home", None).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct DefaultWebInvocationPrivilegeEvaluator {
    interceptor: Arc<SecurityInterceptor<FilterInvocation>>,
}

impl DefaultWebInvocationPrivilegeEvaluator {
    /// Creates an evaluator over the interceptor that guards web requests.
    pub fn new(interceptor: Arc<SecurityInterceptor<FilterInvocation>>) -> Self {
        Self { interceptor }
    }
}

impl WebInvocationPrivilegeEvaluator for DefaultWebInvocationPrivilegeEvaluator {
    fn is_allowed_with(
        &self,
        context_path: &str,
        uri: &str,
        method: Option<&str>,
        authentication: Option<&Authentication>,
    ) -> Result<bool, Error> {
        let Some(authentication) = authentication else {
            return Ok(false);
        };

        let invocation = FilterInvocation::new(uri)
            .with_context_path(context_path)
            .with_method(method.unwrap_or("GET"));
        match self.interceptor.authorize(&invocation, Some(authentication)) {
            Ok(()) => Ok(true),
            Err(Error::AccessDenied(denied)) => {
                tracing::debug!(
                    %invocation,
                    principal = %authentication.name(),
                    reason = %denied,
                    "Privilege evaluation denied"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
