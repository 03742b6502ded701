// src/main.rs

use anyhow::Result;
use dashcam_monitor::camera::{CameraProvider, SimulatedCameraProvider};
use dashcam_monitor::pipeline::DashcamPipeline;
use dashcam_monitor::simulated_events::SimulatedAlertSource;
use dashcam_monitor::types::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load("config.yaml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config.yaml not usable ({e}), falling back to defaults");
            Config::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("dashcam_monitor={}", config.logging.level))
        .init();

    info!("🚗 Dashcam Monitor Starting");
    info!("Backend: {}", config.backend.base_url);

    let alert_source = Box::new(SimulatedAlertSource::new(config.simulation.alert_probability));
    let mut pipeline = DashcamPipeline::new(config, alert_source)?;

    let provider = SimulatedCameraProvider;
    let descriptors = provider.list_available();
    match descriptors.first() {
        Some(descriptor) => {
            info!("Opening camera: {} ({})", descriptor.label, descriptor.id);
            match provider.open(descriptor) {
                Ok(device) => pipeline.set_camera(device),
                Err(e) => error!("Failed to open camera: {}", e),
            }
        }
        None => info!("No camera available; capture ticks will be skipped"),
    }

    pipeline.start();
    pipeline.set_recording(true);
    info!("Pipeline running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    pipeline.set_recording(false);
    pipeline.stop();

    let summary = pipeline.metrics_summary();
    info!("\n📊 Final Report:");
    info!("  Frames captured: {}", summary.frames_captured);
    info!("  Capture failures: {}", summary.capture_failures);
    info!("  Inference successes: {}", summary.inference_successes);
    info!("  Inference failures: {}", summary.inference_failures);
    info!("  Alerts emitted: {}", summary.alerts_emitted);
    info!("  Capture rate: {:.2} frames/s", summary.capture_rate);

    info!("Recent alerts (newest first):");
    for alert in pipeline.recent_alerts() {
        info!("  [{}] {}", alert.kind.as_str(), alert.message);
    }

    if let Some(result) = pipeline.latest_result() {
        info!(
            "Last classification: {} ({:.1}%)",
            result.predicted_label,
            result.confidence * 100.0
        );
    }

    Ok(())
}
