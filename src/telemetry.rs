// src/telemetry.rs
//
// Simulated speed readout. A bounded random walk stepped on its own
// timer; placeholder data in the same spirit as the simulated alerts.

use rand::Rng;

const MIN_SPEED_KMH: f64 = 0.0;
const MAX_SPEED_KMH: f64 = 130.0;
const MAX_STEP_KMH: f64 = 5.0;

pub struct SpeedSimulator {
    speed_kmh: f64,
}

impl SpeedSimulator {
    pub fn new(initial_kmh: f64) -> Self {
        Self {
            speed_kmh: initial_kmh.clamp(MIN_SPEED_KMH, MAX_SPEED_KMH),
        }
    }

    pub fn step(&mut self) -> f64 {
        let delta = rand::thread_rng().gen_range(-MAX_STEP_KMH..=MAX_STEP_KMH);
        self.speed_kmh = (self.speed_kmh + delta).clamp(MIN_SPEED_KMH, MAX_SPEED_KMH);
        self.speed_kmh
    }

    pub fn current(&self) -> f64 {
        self.speed_kmh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_stays_in_bounds() {
        let mut sim = SpeedSimulator::new(60.0);
        for _ in 0..1000 {
            let speed = sim.step();
            assert!((MIN_SPEED_KMH..=MAX_SPEED_KMH).contains(&speed));
        }
    }

    #[test]
    fn test_step_is_bounded() {
        let mut sim = SpeedSimulator::new(60.0);
        let mut previous = sim.current();
        for _ in 0..100 {
            let next = sim.step();
            assert!((next - previous).abs() <= MAX_STEP_KMH + 1e-9);
            previous = next;
        }
    }
}
