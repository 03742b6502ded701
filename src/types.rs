use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub capture: CaptureConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the classification server, e.g. "http://127.0.0.1:5000"
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub alert_tick_ms: u64,
    pub alert_probability: f64,
    pub speed_tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                request_timeout_secs: 30,
            },
            capture: CaptureConfig { interval_ms: 1000 },
            simulation: SimulationConfig {
                enabled: true,
                alert_tick_ms: 3000,
                alert_probability: 0.3,
                speed_tick_ms: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

/// Severity class of a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Danger,
    Warning,
    Info,
    Success,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

/// A single user-facing notification. Immutable once created; removal
/// happens only through the alert log's cap eviction.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: u64,
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// One still frame acquired from the active camera, retained for
/// diagnostics only. Inference gets its own copy of the bytes.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub jpeg: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

/// Parsed classification response for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResult {
    pub predicted_label: String,
    pub confidence: f64,
    pub probabilities: HashMap<String, f64>,
    pub observed_at: DateTime<Utc>,
}
