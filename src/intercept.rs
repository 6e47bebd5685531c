//! Per-invocation orchestration of attribute lookup, decision and run-as.
//!
//! A secured call moves through these stages:
//!
//! 1. resolve the object's attributes (none means public),
//! 2. require an authentication and ask the decision manager,
//! 3. ask the run-as manager for a replacement identity,
//! 4. invoke the target with that identity installed,
//! 5. restore the caller's identity, whatever the target did.
//!
//! Any error stops the pipeline at the stage that produced it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::access::{
    AccessDecisionManager, ConfigAttribute, NullRunAsManager, RunAsManager, SecurityMetadataSource,
};
use crate::authentication::Authentication;
use crate::context::{ReactiveSecurityContextHolder, SecurityContext, SecurityContextHolder};
use crate::error::{AccessDenied, DenialKind, Error};
use crate::observation::{AuthorizationObservation, AuthorizationOutcome, ObservationSink};

/// Result of a successful pre-invocation check.
#[derive(Debug, Clone)]
pub struct InterceptorStatusToken {
    attributes: Vec<ConfigAttribute>,
    run_as: Option<Authentication>,
}

impl InterceptorStatusToken {
    /// Returns the attributes that were decided on; empty for public objects.
    pub fn attributes(&self) -> &[ConfigAttribute] {
        &self.attributes
    }

    /// Returns `true` when the object had no attributes.
    pub fn is_public(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the run-as identity to install for the invocation, if any.
    pub fn run_as(&self) -> Option<&Authentication> {
        self.run_as.as_ref()
    }

    /// Consumes the token, yielding the run-as identity.
    pub fn into_run_as(self) -> Option<Authentication> {
        self.run_as
    }
}

/// Guards invocations on secured objects of type `O`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use access_core::{
///     AffirmativeBased, Authentication, ConfigAttribute, Error, MapSecurityMetadataSource,
///     RoleVoter, SecurityContextHolder, SecurityInterceptor,
/// };
///
/// let metadata = MapSecurityMetadataSource::new()
///     .with("close_account", ConfigAttribute::list("ROLE_ADMIN"));
/// let manager = AffirmativeBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
/// let interceptor = SecurityInterceptor::<str>::new(Arc::new(metadata), Arc::new(manager));
///
/// SecurityContextHolder::set_authentication(Authentication::new("bob", "pw", ["ROLE_USER"]));
/// let result = interceptor.invoke("close_account", || Ok::<_, Error>("closed"));
/// assert!(result.unwrap_err().is_access_denied());
///
/// SecurityContextHolder::set_authentication(Authentication::new("root", "pw", ["ROLE_ADMIN"]));
/// assert_eq!(interceptor.invoke("close_account", || Ok::<_, Error>("closed")).unwrap(), "closed");
/// SecurityContextHolder::clear_context();
/// ```
pub struct SecurityInterceptor<O: ?Sized> {
    metadata_source: Arc<dyn SecurityMetadataSource<O>>,
    decision_manager: Arc<dyn AccessDecisionManager<O>>,
    run_as_manager: Arc<dyn RunAsManager<O>>,
    observation_sink: Option<Arc<dyn ObservationSink>>,
    reject_public_invocations: bool,
}

impl<O: ?Sized + 'static> SecurityInterceptor<O> {
    /// Creates an interceptor that never substitutes identities and allows
    /// public invocations.
    pub fn new(
        metadata_source: Arc<dyn SecurityMetadataSource<O>>,
        decision_manager: Arc<dyn AccessDecisionManager<O>>,
    ) -> Self {
        Self {
            metadata_source,
            decision_manager,
            run_as_manager: Arc::new(NullRunAsManager),
            observation_sink: None,
            reject_public_invocations: false,
        }
    }

    /// Sets the run-as manager.
    pub fn run_as_manager(mut self, run_as_manager: Arc<dyn RunAsManager<O>>) -> Self {
        self.run_as_manager = run_as_manager;
        self
    }

    /// Sends one observation per decision to `sink`.
    pub fn observation_sink(mut self, sink: Arc<dyn ObservationSink>) -> Self {
        self.observation_sink = Some(sink);
        self
    }

    /// Denies objects that have no attributes instead of letting them through.
    pub fn reject_public_invocations(mut self, reject: bool) -> Self {
        self.reject_public_invocations = reject;
        self
    }
}

impl<O: ?Sized + fmt::Display> SecurityInterceptor<O> {
    /// Resolves attributes and decides, without run-as or invocation.
    ///
    /// # Errors
    ///
    /// - [`Error::AccessDenied`] when a policy refuses, including a public
    ///   object while public invocations are rejected.
    /// - [`Error::AuthenticationCredentialsNotFound`] when the object is
    ///   secured and `authentication` is `None`.
    /// - Any other error the decision manager raised.
    pub fn authorize(&self, object: &O, authentication: Option<&Authentication>) -> Result<(), Error> {
        self.attempt_authorization(object, authentication).map(drop)
    }

    /// Authorizes and prepares the run-as identity for one invocation.
    ///
    /// # Errors
    ///
    /// Same as [`authorize`](Self::authorize).
    pub fn before_invocation(
        &self,
        object: &O,
        authentication: Option<&Authentication>,
    ) -> Result<InterceptorStatusToken, Error> {
        let attributes = self.attempt_authorization(object, authentication)?;
        let run_as = match authentication {
            Some(authentication) if !attributes.is_empty() => {
                self.run_as_manager
                    .build_run_as(authentication, object, &attributes)
            }
            _ => None,
        };
        if let Some(run_as) = &run_as {
            tracing::debug!(
                object = %object,
                principal = %run_as.name(),
                "Switching to run-as authentication"
            );
        }
        Ok(InterceptorStatusToken { attributes, run_as })
    }

    /// Runs `target` on this thread if the current thread's authentication may
    /// access `object`.
    ///
    /// A run-as identity is visible to `target` through
    /// [`SecurityContextHolder`] and the caller's context is back in place
    /// when this returns, whether `target` succeeded, failed or panicked.
    ///
    /// # Errors
    ///
    /// Authorization errors, converted into `E`, or whatever `target` returns.
    pub fn invoke<T, E, F>(&self, object: &O, target: F) -> Result<T, E>
    where
        E: From<Error>,
        F: FnOnce() -> Result<T, E>,
    {
        let authentication = SecurityContextHolder::authentication();
        let token = self.before_invocation(object, authentication.as_ref())?;
        let _restore = token
            .into_run_as()
            .map(|run_as| SecurityContextHolder::enter(Some(SecurityContext::new(run_as))));
        target()
    }

    /// Async form of [`invoke`](Self::invoke) over the task-scoped store.
    ///
    /// The run-as identity is scoped to `target` alone; the caller's task
    /// never observes it.
    ///
    /// # Errors
    ///
    /// Authorization errors, converted into `E`, or whatever `target` returns.
    pub async fn invoke_async<T, E, Fut>(&self, object: &O, target: Fut) -> Result<T, E>
    where
        E: From<Error>,
        Fut: Future<Output = Result<T, E>>,
    {
        let authentication = ReactiveSecurityContextHolder::authentication();
        let token = self.before_invocation(object, authentication.as_ref())?;
        match token.into_run_as() {
            Some(run_as) => ReactiveSecurityContextHolder::with_authentication(run_as, target).await,
            None => target.await,
        }
    }

    fn attempt_authorization(
        &self,
        object: &O,
        authentication: Option<&Authentication>,
    ) -> Result<Vec<ConfigAttribute>, Error> {
        let attributes = self.metadata_source.attributes(object).unwrap_or_default();
        if attributes.is_empty() {
            if self.reject_public_invocations {
                return Err(AccessDenied::new(
                    DenialKind::PublicInvocationRejected,
                    format!(
                        "Secure object invocation {} was denied as public invocations are not allowed",
                        object
                    ),
                )
                .into());
            }
            tracing::trace!(object = %object, "Public object, authentication not attempted");
            return Ok(attributes);
        }

        let Some(authentication) = authentication else {
            return Err(Error::AuthenticationCredentialsNotFound(
                "An Authentication object was not found in the SecurityContext".to_string(),
            ));
        };

        let result = self
            .decision_manager
            .decide(authentication, object, &attributes);
        let outcome = match &result {
            Ok(()) => AuthorizationOutcome::Granted,
            Err(Error::AccessDenied(_)) => AuthorizationOutcome::Denied,
            Err(_) => AuthorizationOutcome::Error,
        };
        tracing::debug!(
            object = %object,
            principal = %authentication.name(),
            %outcome,
            "Authorization decided"
        );
        if let Some(sink) = &self.observation_sink {
            sink.observe(
                &AuthorizationObservation::new(object.to_string(), outcome)
                    .with_authentication(authentication)
                    .with_attributes(&attributes),
            );
        }

        result.map(|()| attributes)
    }
}

impl<O: ?Sized> fmt::Debug for SecurityInterceptor<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityInterceptor")
            .field("observed", &self.observation_sink.is_some())
            .field("reject_public_invocations", &self.reject_public_invocations)
            .finish_non_exhaustive()
    }
}
