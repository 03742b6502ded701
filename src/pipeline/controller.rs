// src/pipeline/controller.rs
//
// Owns every piece of mutable pipeline state (alert log, frame and
// result histories, connectivity flag, recording flag) behind one
// controller with an explicit start()/stop() lifecycle, instead of the
// ambient globals the prototype grew.
//
// Timer cadence lives in start(); the per-tick handlers are plain
// methods so tests drive ticks without wall-clock time. A capture tick
// never awaits the network: each inference request rides its own task,
// and successive requests may be in flight together. Results land in
// completion order, not capture order.

use crate::alert_log::AlertLog;
use crate::camera::CameraDevice;
use crate::connectivity::ConnectivityMonitor;
use crate::history::CappedHistory;
use crate::inference_client::{InferenceClient, InferenceError};
use crate::pipeline::metrics::{MetricsSummary, PipelineMetrics};
use crate::simulated_events::AlertSource;
use crate::telemetry::SpeedSimulator;
use crate::types::{Alert, AlertKind, CapturedFrame, Config, InferenceResult};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Captured frames retained for diagnostics.
pub const FRAME_HISTORY_CAP: usize = 100;
/// Inference results retained.
pub const RESULT_HISTORY_CAP: usize = 50;

struct PipelineState {
    alerts: Mutex<AlertLog>,
    frames: Mutex<CappedHistory<CapturedFrame>>,
    results: Mutex<CappedHistory<InferenceResult>>,
    camera: Mutex<Option<Box<dyn CameraDevice>>>,
    speed: Mutex<SpeedSimulator>,
    alert_source: Mutex<Box<dyn AlertSource>>,
    recording_started: Mutex<Option<Instant>>,
    connected: AtomicBool,
    recording: AtomicBool,
    inference: InferenceClient,
    connectivity: ConnectivityMonitor,
    metrics: PipelineMetrics,
    cancel: CancellationToken,
}

pub struct DashcamPipeline {
    state: Arc<PipelineState>,
    tasks: Vec<JoinHandle<()>>,
    config: Config,
}

impl DashcamPipeline {
    pub fn new(config: Config, alert_source: Box<dyn AlertSource>) -> Result<Self> {
        let inference = InferenceClient::new(
            &config.backend.base_url,
            Duration::from_secs(config.backend.request_timeout_secs),
        )?;
        let connectivity = ConnectivityMonitor::new(&config.backend.base_url)?;

        let state = Arc::new(PipelineState {
            alerts: Mutex::new(AlertLog::new()),
            frames: Mutex::new(CappedHistory::new(FRAME_HISTORY_CAP)),
            results: Mutex::new(CappedHistory::new(RESULT_HISTORY_CAP)),
            camera: Mutex::new(None),
            speed: Mutex::new(SpeedSimulator::new(0.0)),
            alert_source: Mutex::new(alert_source),
            recording_started: Mutex::new(None),
            connected: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            inference,
            connectivity,
            metrics: PipelineMetrics::new(),
            cancel: CancellationToken::new(),
        });

        Ok(Self {
            state,
            tasks: Vec::new(),
            config,
        })
    }

    /// Spawn the periodic loops: capture, simulated speed, and (when
    /// enabled) simulated alerts, plus the one-shot startup health probe.
    pub fn start(&mut self) {
        info!(
            backend = %self.config.backend.base_url,
            capture_interval_ms = self.config.capture.interval_ms,
            "starting dashcam pipeline"
        );

        {
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                run_connectivity_probe(&state).await;
            });
        }

        {
            let state = Arc::clone(&self.state);
            let interval_ms = self.config.capture.interval_ms;
            self.tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
                loop {
                    tokio::select! {
                        _ = state.cancel.cancelled() => {
                            info!("capture loop stopped");
                            break;
                        }
                        _ = interval.tick() => {
                            run_capture_tick(&state);
                        }
                    }
                }
            }));
        }

        {
            let state = Arc::clone(&self.state);
            let interval_ms = self.config.simulation.speed_tick_ms;
            self.tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
                loop {
                    tokio::select! {
                        _ = state.cancel.cancelled() => break,
                        _ = interval.tick() => {
                            lock(&state.speed).step();
                        }
                    }
                }
            }));
        }

        if self.config.simulation.enabled {
            let state = Arc::clone(&self.state);
            let interval_ms = self.config.simulation.alert_tick_ms;
            self.tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
                loop {
                    tokio::select! {
                        _ = state.cancel.cancelled() => break,
                        _ = interval.tick() => {
                            run_simulated_alert_tick(&state);
                        }
                    }
                }
            }));
        }
    }

    /// Stop the periodic loops. An in-flight inference request is not
    /// aborted; its outcome is discarded by the cancellation guard.
    pub fn stop(&mut self) {
        info!("stopping dashcam pipeline");
        self.state.cancel.cancel();
        self.tasks.clear();
    }

    // ── collaborators ────────────────────────────────────────────────

    pub fn set_camera(&self, device: Box<dyn CameraDevice>) {
        *lock(&self.state.camera) = Some(device);
        info!("camera attached");
    }

    pub fn clear_camera(&self) {
        *lock(&self.state.camera) = None;
        info!("camera detached");
    }

    /// Probe the classification server's health endpoint once, updating
    /// the connectivity flag and raising one alert either way.
    pub async fn check_connectivity(&self) -> bool {
        run_connectivity_probe(&self.state).await
    }

    // ── tick handlers (called by the timers, and directly by tests) ──

    pub fn capture_tick(&self) {
        run_capture_tick(&self.state);
    }

    pub fn speed_tick(&self) -> f64 {
        lock(&self.state.speed).step()
    }

    pub fn simulated_alert_tick(&self) {
        run_simulated_alert_tick(&self.state);
    }

    // ── recording session ────────────────────────────────────────────

    pub fn set_recording(&self, on: bool) {
        let was = self.state.recording.swap(on, Ordering::Relaxed);
        if on && !was {
            *lock(&self.state.recording_started) = Some(Instant::now());
            info!("recording started");
        } else if !on && was {
            *lock(&self.state.recording_started) = None;
            info!("recording stopped");
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state.recording.load(Ordering::Relaxed)
    }

    pub fn recording_duration(&self) -> Option<Duration> {
        lock(&self.state.recording_started)
            .as_ref()
            .map(|started| started.elapsed())
    }

    // ── read-side accessors ──────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Relaxed)
    }

    pub fn current_speed_kmh(&self) -> f64 {
        lock(&self.state.speed).current()
    }

    /// Alerts newest-first, at most the log cap.
    pub fn recent_alerts(&self) -> Vec<Alert> {
        lock(&self.state.alerts).iter().cloned().collect()
    }

    pub fn latest_result(&self) -> Option<InferenceResult> {
        lock(&self.state.results).newest().cloned()
    }

    pub fn frame_history_len(&self) -> usize {
        lock(&self.state.frames).len()
    }

    pub fn result_history_len(&self) -> usize {
        lock(&self.state.results).len()
    }

    pub fn metrics_summary(&self) -> MetricsSummary {
        self.state.metrics.summary()
    }
}

impl Drop for DashcamPipeline {
    fn drop(&mut self) {
        self.state.cancel.cancel();
    }
}

// ============================================================================
// TICK HANDLERS
// ============================================================================

fn run_capture_tick(state: &Arc<PipelineState>) {
    let jpeg = {
        let mut camera = lock(&state.camera);
        let Some(device) = camera.as_mut() else {
            // No ready device is a silent skip, unlike inference failures.
            state.metrics.inc(&state.metrics.ticks_without_camera);
            debug!("capture tick skipped: no camera ready");
            return;
        };
        match device.capture() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("frame capture failed: {}", e);
                state.metrics.inc(&state.metrics.capture_failures);
                return;
            }
        }
    };

    let captured_at = Utc::now();
    lock(&state.frames).push(CapturedFrame {
        jpeg: jpeg.clone(),
        captured_at,
    });
    state.metrics.inc(&state.metrics.frames_captured);

    let state = Arc::clone(state);
    tokio::spawn(async move {
        run_inference(state, jpeg, captured_at).await;
    });
}

async fn run_inference(state: Arc<PipelineState>, jpeg: Vec<u8>, captured_at: DateTime<Utc>) {
    let outcome = state.inference.classify(jpeg, captured_at).await;
    if state.cancel.is_cancelled() {
        debug!("pipeline stopped; discarding inference outcome");
        return;
    }
    apply_inference_outcome(&state, outcome);
}

fn apply_inference_outcome(
    state: &PipelineState,
    outcome: std::result::Result<InferenceResult, InferenceError>,
) {
    match outcome {
        Ok(result) => {
            lock(&state.results).push(result.clone());
            state.metrics.inc(&state.metrics.inference_successes);

            push_alert(
                state,
                AlertKind::Info,
                format!(
                    "{} ({:.1}%)",
                    result.predicted_label,
                    result.confidence * 100.0
                ),
            );
            for (label, probability) in &result.probabilities {
                push_alert(
                    state,
                    AlertKind::Info,
                    format!("{}: {:.1}%", label, probability * 100.0),
                );
            }
        }
        Err(e) => {
            error!("inference failed: {}", e);
            state.metrics.inc(&state.metrics.inference_failures);
            push_alert(state, AlertKind::Danger, failure_alert_message(&e));
        }
    }
}

fn failure_alert_message(error: &InferenceError) -> String {
    match error {
        InferenceError::Server { status } => {
            format!("Analysis failed: server returned HTTP {}", status.as_u16())
        }
        InferenceError::Transport(_) => {
            "Analysis failed: could not reach classification server".to_string()
        }
        InferenceError::MalformedResponse(_) => {
            "Analysis failed: could not read server response".to_string()
        }
    }
}

fn run_simulated_alert_tick(state: &Arc<PipelineState>) {
    if !state.recording.load(Ordering::Relaxed) {
        return;
    }
    let event = lock(&state.alert_source).poll();
    if let Some((kind, message)) = event {
        state.metrics.inc(&state.metrics.simulated_alerts);
        push_alert(state, kind, message);
    }
}

async fn run_connectivity_probe(state: &Arc<PipelineState>) -> bool {
    let reachable = state.connectivity.probe().await;
    if state.cancel.is_cancelled() {
        return reachable;
    }
    state.connected.store(reachable, Ordering::Relaxed);
    if reachable {
        push_alert(
            state,
            AlertKind::Success,
            "Connected to classification server".to_string(),
        );
    } else {
        push_alert(
            state,
            AlertKind::Danger,
            "Classification server unreachable".to_string(),
        );
    }
    reachable
}

fn push_alert(state: &PipelineState, kind: AlertKind, message: String) {
    lock(&state.alerts).add_alert(kind, message);
    state.metrics.inc(&state.metrics.alerts_emitted);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
