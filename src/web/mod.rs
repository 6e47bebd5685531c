//! Web request security.
//!
//! This module carries the pipeline to HTTP requests without depending on
//! any web framework. Framework glue builds a [`FilterInvocation`] from its
//! own request type and hands it to a [`SecurityFilterChain`]:
//!
//! ```text
//! request ─► load context (SecurityContextRepository)
//!         ─► anonymous fallback (AnonymousAuthenticationFilter)
//!         ─► authorize (SecurityInterceptor<FilterInvocation>)
//!         ─► handler
//!         ─► save context, restore thread
//! ```
//!
//! Rules are expressed as [`RequestMatcher`]s mapped to attributes by a
//! [`RequestMatcherMetadataSource`].

mod anonymous;
mod filter;
mod invocation;
mod matcher;
mod repository;

pub use anonymous::AnonymousAuthenticationFilter;
pub use filter::SecurityFilterChain;
pub use invocation::FilterInvocation;
pub use matcher::{AntPathRequestMatcher, AnyRequestMatcher, RequestMatcher, RequestMatcherMetadataSource};
pub use repository::{SecurityContextRepository, SessionSecurityContextRepository};
