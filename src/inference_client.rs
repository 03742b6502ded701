// src/inference_client.rs
//
// Round-trips one captured frame through the remote classification
// endpoint: multipart POST of the JPEG plus the capture timestamp,
// JSON response parsed into an InferenceResult.
//
// Every failure path is typed. Nothing here retries; one attempt per
// frame, one outcome per attempt.

use crate::types::InferenceResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Multipart field carrying the JPEG bytes.
const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the ISO-8601 capture timestamp.
const TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Error)]
pub enum InferenceError {
    /// DNS, connect, timeout, or any other transport-level failure.
    #[error("could not reach classification server: {0}")]
    Transport(#[from] reqwest::Error),
    /// Server answered with a non-200 status.
    #[error("classification server returned HTTP {status}")]
    Server { status: reqwest::StatusCode },
    /// 200 response whose body is not the expected JSON shape.
    #[error("malformed response from classification server: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    prediction: String,
    confidence: f64,
    #[serde(default)]
    all_probabilities: HashMap<String, f64>,
}

pub struct InferenceClient {
    http_client: reqwest::Client,
    analyze_url: String,
}

impl InferenceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            analyze_url: format!("{}/analyze", base_url.trim_end_matches('/')),
        })
    }

    /// Classify one frame. The JPEG goes out under a timestamped filename
    /// so server-side logs can correlate frames with capture time.
    pub async fn classify(
        &self,
        jpeg: Vec<u8>,
        captured_at: DateTime<Utc>,
    ) -> Result<InferenceResult, InferenceError> {
        let filename = format!("dashcam_{}.jpg", captured_at.timestamp_millis());
        let image_part = reqwest::multipart::Part::bytes(jpeg)
            .file_name(filename)
            .mime_str("image/jpeg")?;

        let form = reqwest::multipart::Form::new()
            .part(IMAGE_FIELD, image_part)
            .text(TIMESTAMP_FIELD, captured_at.to_rfc3339());

        debug!(url = %self.analyze_url, "sending frame for classification");

        let response = self
            .http_client
            .post(&self.analyze_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Server { status });
        }

        let body = response.bytes().await?;
        let parsed = parse_analyze_body(&body)?;

        Ok(InferenceResult {
            predicted_label: parsed.prediction,
            confidence: parsed.confidence,
            probabilities: parsed.all_probabilities,
            observed_at: Utc::now(),
        })
    }
}

fn parse_analyze_body(body: &[u8]) -> Result<AnalyzeResponse, InferenceError> {
    serde_json::from_slice(body).map_err(|e| InferenceError::MalformedResponse(e.to_string()))
}
