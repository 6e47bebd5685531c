use parking_lot::Mutex;

use super::{AuthorizationObservation, ObservationSink};

/// In-memory observation recorder, mostly for tests.
#[derive(Debug, Default)]
pub struct ObservationTrail {
    observations: Mutex<Vec<AuthorizationObservation>>,
}

impl ObservationTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observation.
    pub fn record(&self, observation: AuthorizationObservation) {
        self.observations.lock().push(observation);
    }

    /// Returns a copy of everything recorded so far, oldest first.
    pub fn observations(&self) -> Vec<AuthorizationObservation> {
        self.observations.lock().clone()
    }

    /// Returns the number of recorded observations.
    pub fn len(&self) -> usize {
        self.observations.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.observations.lock().is_empty()
    }

    /// Forgets every recorded observation.
    pub fn clear(&self) {
        self.observations.lock().clear();
    }
}

impl ObservationSink for ObservationTrail {
    fn observe(&self, observation: &AuthorizationObservation) {
        self.record(observation.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::observation::AuthorizationOutcome;

    #[test]
    fn trail_starts_empty() {
        let trail = ObservationTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn trail_records_in_order_and_clears() {
        let trail = ObservationTrail::new();
        trail.observe(&AuthorizationObservation::new("first", AuthorizationOutcome::Granted));
        trail.observe(&AuthorizationObservation::new("second", AuthorizationOutcome::Denied));

        let observed = trail.observations();
        assert_eq!(observed[0].object(), "first");
        assert_eq!(observed[1].outcome(), AuthorizationOutcome::Denied);

        trail.clear();
        assert!(trail.is_empty());
    }

    #[test]
    fn trail_is_shareable_across_threads() {
        let trail = Arc::new(ObservationTrail::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let trail = Arc::clone(&trail);
                std::thread::spawn(move || {
                    trail.record(AuthorizationObservation::new(
                        format!("op-{}", i),
                        AuthorizationOutcome::Granted,
                    ))
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(trail.len(), 4);
    }
}
