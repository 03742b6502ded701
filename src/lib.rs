// src/lib.rs

pub mod alert_log;
pub mod camera;
pub mod config;
pub mod connectivity;
pub mod history;
pub mod inference_client;
pub mod pipeline;
pub mod simulated_events;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use alert_log::{AlertLog, ALERT_LOG_CAP};
pub use camera::{CameraDescriptor, CameraDevice, CameraProvider, SimulatedCameraProvider};
pub use connectivity::ConnectivityMonitor;
pub use inference_client::{InferenceClient, InferenceError};
pub use pipeline::{DashcamPipeline, MetricsSummary};
pub use simulated_events::{AlertSource, SimulatedAlertSource};
pub use types::{Alert, AlertKind, CapturedFrame, Config, InferenceResult};
