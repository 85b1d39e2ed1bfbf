//! Core types for capture operations.
//!
//! This module contains the error taxonomy shared by every stage of a
//! capture, plus the summaries returned to callers.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Custom error type for capture operations
///
/// Per-asset and per-download problems never surface here; they are
/// logged and absorbed by the codec and the style reconciler.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The browser could not reach the page
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A script could not be evaluated or its result could not be decoded
    #[error("Page evaluation failed: {0}")]
    Evaluation(String),

    /// A readiness selector never appeared or matched nothing
    #[error("Selector '{selector}' not satisfied: {message}")]
    Selector { selector: String, message: String },

    /// Browser launch, page creation or CDP transport failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// Network activity never quiesced within the hard timeout
    #[error("Network did not become idle within {elapsed:?} ({in_flight} requests still in flight)")]
    IdleTimeout { elapsed: Duration, in_flight: usize },

    /// External cancellation
    #[error("Capture operation was cancelled")]
    Cancelled,

    /// A single browser operation exceeded its timeout
    #[error("{operation} timeout after {elapsed:?}")]
    Timeout { operation: String, elapsed: Duration },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for CaptureError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Other(format!("{err:#}"))
    }
}

impl CaptureError {
    /// Whether the page loaded but never went quiet.
    ///
    /// Callers can retry these with a longer hard timeout; a navigation
    /// failure will not improve with more waiting.
    #[must_use]
    pub fn is_idle_timeout(&self) -> bool {
        matches!(self, Self::IdleTimeout { .. })
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenience alias for Result with `CaptureError`
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Outcome of the DOM snapshot stage
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSummary {
    pub html_path: PathBuf,
    pub asset_dir: PathBuf,
    /// Distinct embedded payloads written to `asset_dir`
    pub assets_saved: usize,
    pub html_bytes: usize,
}

/// Everything one capture run wrote to disk
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub url: String,
    pub snapshot: CaptureSummary,
    pub stylesheets: Vec<PathBuf>,
    pub stylesheet_failures: Vec<String>,
    pub inline_styles: Vec<PathBuf>,
    pub dynamic_styles: Vec<PathBuf>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}
