//! Capture engine: error taxonomy, step timeouts, and run sequencing.

pub mod capture_types;
pub mod orchestrator;
pub mod page_timeout;

pub use capture_types::{CaptureError, CaptureReport, CaptureResult, CaptureSummary};
pub use orchestrator::{capture_site, run_capture};
