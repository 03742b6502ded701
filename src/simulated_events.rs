// src/simulated_events.rs
//
// Placeholder alert content, kept behind a trait so a production build
// can drop it without touching the inference path or the alert fanout.

use crate::types::AlertKind;
use rand::Rng;

/// A source the pipeline polls on its own timer while recording is on.
/// Returning None means "nothing this tick".
pub trait AlertSource: Send {
    fn poll(&mut self) -> Option<(AlertKind, String)>;
}

/// Demo generator: on each poll, with fixed probability, one of a small
/// fixed set of (kind, message) pairs.
pub struct SimulatedAlertSource {
    probability: f64,
    events: Vec<(AlertKind, &'static str)>,
}

impl SimulatedAlertSource {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            events: vec![
                (AlertKind::Warning, "Vehicle braking ahead"),
                (AlertKind::Danger, "Following distance critical"),
                (AlertKind::Info, "Lane departure detected"),
                (AlertKind::Warning, "Pedestrian near roadway"),
                (AlertKind::Success, "Safe following distance restored"),
            ],
        }
    }
}

impl AlertSource for SimulatedAlertSource {
    fn poll(&mut self) -> Option<(AlertKind, String)> {
        let mut rng = rand::thread_rng();
        if !rng.gen_bool(self.probability) {
            return None;
        }
        let (kind, message) = self.events[rng.gen_range(0..self.events.len())];
        Some((kind, message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_zero_never_fires() {
        let mut source = SimulatedAlertSource::new(0.0);
        for _ in 0..50 {
            assert!(source.poll().is_none());
        }
    }

    #[test]
    fn test_probability_one_always_fires() {
        let mut source = SimulatedAlertSource::new(1.0);
        for _ in 0..50 {
            assert!(source.poll().is_some());
        }
    }
}
