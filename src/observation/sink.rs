use super::AuthorizationObservation;

/// Receives authorization observations, fire-and-forget.
pub trait ObservationSink: Send + Sync {
    /// Handles one observation.
    fn observe(&self, observation: &AuthorizationObservation);
}

impl<F> ObservationSink for F
where
    F: Fn(&AuthorizationObservation) + Send + Sync,
{
    fn observe(&self, observation: &AuthorizationObservation) {
        self(observation)
    }
}

/// Emits observations as structured `tracing` events under the
/// `authorization` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservationSink;

impl ObservationSink for TracingObservationSink {
    fn observe(&self, observation: &AuthorizationObservation) {
        tracing::info!(
            target: "authorization",
            object = %observation.object(),
            outcome = %observation.outcome(),
            principal = ?observation.principal(),
            authorities = ?observation.authorities(),
            attributes = ?observation.attributes(),
            "authorization decision"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::observation::AuthorizationOutcome;

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        let observation = AuthorizationObservation::new("op", AuthorizationOutcome::Error);
        TracingObservationSink.observe(&observation);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = AtomicUsize::new(0);
        let sink = |_: &AuthorizationObservation| {
            seen.fetch_add(1, Ordering::SeqCst);
        };
        sink.observe(&AuthorizationObservation::new("op", AuthorizationOutcome::Granted));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
