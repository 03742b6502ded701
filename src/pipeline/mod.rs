// src/pipeline/mod.rs

pub mod controller;
pub mod metrics;

pub use controller::{DashcamPipeline, FRAME_HISTORY_CAP, RESULT_HISTORY_CAP};
pub use metrics::{MetricsSummary, PipelineMetrics};
