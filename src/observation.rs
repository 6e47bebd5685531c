//! Authorization observations.
//!
//! Every authorization decision made by a
//! [`SecurityInterceptor`](crate::SecurityInterceptor) produces one
//! [`AuthorizationObservation`]. It is handed to an [`ObservationSink`] and
//! then dropped; sinks cannot influence the decision.
//!
//! Observations carry only names: the principal name, authority names and
//! attribute tokens. Credentials never reach a sink.

mod event;
mod sink;
mod trail;

pub use event::{AuthorizationObservation, AuthorizationOutcome};
pub use sink::{ObservationSink, TracingObservationSink};
pub use trail::ObservationTrail;
