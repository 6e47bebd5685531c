//! Authorization decision pipeline.
//!
//! This crate decides whether an authenticated principal may invoke a
//! secured object, and carries the principal through the code that runs on
//! its behalf:
//! - **Context stores**: a per-thread [`SecurityContextHolder`] and a
//!   task-scoped [`ReactiveSecurityContextHolder`] for async code
//! - **Decisions**: [`AccessDecisionVoter`]s combined by an
//!   [`AccessDecisionManager`] over the [`ConfigAttribute`]s a
//!   [`SecurityMetadataSource`] assigns to each object
//! - **Interception**: [`SecurityInterceptor`] runs lookup, decision and
//!   run-as substitution around each invocation and always restores the
//!   caller's identity
//! - **Queries**: [`WebInvocationPrivilegeEvaluator`] answers "would this
//!   be allowed?" and [`SidRetrievalStrategy`] lists a principal's
//!   security identities
//!
//! # Core Types
//!
//! - [`Authentication`]: principal, redacted credentials and authorities
//! - [`SecurityContext`]: the slot holding the current authentication
//! - [`Error`]: denial, missing credentials, bad arguments or infrastructure failure
//! - [`SecurityFilterChain`]: the web request pipeline, built by hand or from
//!   a TOML [`SecurityConfig`]
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use access_core::{
//!     AffirmativeBased, Authentication, ConfigAttribute, Error, MapSecurityMetadataSource,
//!     RoleVoter, RunAsManagerImpl, SecurityContextHolder, SecurityInterceptor,
//! };
//!
//! let metadata = MapSecurityMetadataSource::new()
//!     .with("generate_report", ConfigAttribute::list("ROLE_ANALYST,RUN_AS_REPORTING"));
//! let manager = AffirmativeBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
//! let interceptor = SecurityInterceptor::<str>::new(Arc::new(metadata), Arc::new(manager))
//!     .run_as_manager(Arc::new(RunAsManagerImpl::new("run-as-key").unwrap()));
//!
//! SecurityContextHolder::set_authentication(Authentication::new("ann", "pw", ["ROLE_ANALYST"]));
//!
//! let elevated = interceptor
//!     .invoke("generate_report", || {
//!         let current = SecurityContextHolder::authentication().unwrap();
//!         Ok::<_, Error>(current.has_authority("ROLE_RUN_AS_REPORTING"))
//!     })
//!     .unwrap();
//! assert!(elevated);
//!
//! // The caller's own identity is back once the invocation returns.
//! let after = SecurityContextHolder::authentication().unwrap();
//! assert!(!after.has_authority("ROLE_RUN_AS_REPORTING"));
//! SecurityContextHolder::clear_context();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod authority;
pub mod config;
pub mod context;
pub mod observation;
pub mod web;

mod authentication;
mod error;
mod intercept;
mod privilege;
mod secret;
mod sid;

pub use access::{
    AccessDecisionManager, AccessDecisionVoter, AffirmativeBased, AuthenticatedVoter, ConfigAttribute,
    ConsensusBased, DenyAllPermissionEvaluator, MapSecurityMetadataSource, NullRunAsManager,
    PermissionEvaluator, RoleHierarchyVoter, RoleVoter, RunAsManager, RunAsManagerImpl,
    SecurityMetadataSource, UnanimousBased, Vote, RUN_AS_PREFIX,
};
pub use authentication::{Authentication, AuthenticationBuilder, AuthenticationKind, KeyDigest};
pub use authority::{
    GrantedAuthority, NullRoleHierarchy, RoleHierarchy, RoleHierarchyImpl, SimpleAuthorityMapper,
    SimpleMappableAttributesRetriever,
};
pub use config::{ConfigError, SecurityConfig};
pub use context::{
    ContextGuard, DelegatingSecurityContextExecutor, DelegatingSecurityContextTask,
    ReactiveSecurityContextHolder, SchedulingTaskExecutor, SecurityContext, SecurityContextHolder, Task,
    TaskExecutor,
};
pub use error::{AccessDenied, DenialKind, Error};
pub use intercept::{InterceptorStatusToken, SecurityInterceptor};
pub use observation::{
    AuthorizationObservation, AuthorizationOutcome, ObservationSink, ObservationTrail,
    TracingObservationSink,
};
pub use privilege::{DefaultWebInvocationPrivilegeEvaluator, WebInvocationPrivilegeEvaluator};
pub use secret::Secret;
pub use sid::{DefaultSidRetrievalStrategy, Sid, SidRetrievalStrategy};
pub use web::{
    AnonymousAuthenticationFilter, AntPathRequestMatcher, AnyRequestMatcher, FilterInvocation,
    RequestMatcher, RequestMatcherMetadataSource, SecurityContextRepository, SecurityFilterChain,
    SessionSecurityContextRepository,
};
