// src/pipeline/metrics.rs
//
// Pipeline observability. Tracks counts and rates for every subsystem;
// export via logs at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub frames_captured: Arc<AtomicU64>,
    pub capture_failures: Arc<AtomicU64>,
    pub ticks_without_camera: Arc<AtomicU64>,
    pub inference_successes: Arc<AtomicU64>,
    pub inference_failures: Arc<AtomicU64>,
    pub alerts_emitted: Arc<AtomicU64>,
    pub simulated_alerts: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            frames_captured: Arc::new(AtomicU64::new(0)),
            capture_failures: Arc::new(AtomicU64::new(0)),
            ticks_without_camera: Arc::new(AtomicU64::new(0)),
            inference_successes: Arc::new(AtomicU64::new(0)),
            inference_failures: Arc::new(AtomicU64::new(0)),
            alerts_emitted: Arc::new(AtomicU64::new(0)),
            simulated_alerts: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames captured per second since startup.
    pub fn capture_rate(&self) -> f64 {
        let frames = self.frames_captured.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            ticks_without_camera: self.ticks_without_camera.load(Ordering::Relaxed),
            inference_successes: self.inference_successes.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            alerts_emitted: self.alerts_emitted.load(Ordering::Relaxed),
            simulated_alerts: self.simulated_alerts.load(Ordering::Relaxed),
            capture_rate: self.capture_rate(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub frames_captured: u64,
    pub capture_failures: u64,
    pub ticks_without_camera: u64,
    pub inference_successes: u64,
    pub inference_failures: u64,
    pub alerts_emitted: u64,
    pub simulated_alerts: u64,
    pub capture_rate: f64,
    pub elapsed_secs: f64,
}
