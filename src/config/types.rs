//! Core configuration types for page capture
//!
//! This module contains the `CaptureConfig` struct that defines where a
//! capture runs, where it writes, and how long each stage may take.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for a capture run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Page to render. Always an absolute http(s) URL (validated in builder).
    pub(crate) target_url: String,

    /// Directory receiving `rendered_after_js.html`, `assets/`, `css/`,
    /// `inline/` and `dynamic/`
    pub(crate) output_dir: PathBuf,

    /// Quiet period with zero in-flight requests before the page counts as
    /// settled
    ///
    /// Default: 1000 ms
    pub(crate) idle_window_ms: u64,

    /// Ceiling on the network-idle wait
    ///
    /// Default: 30 seconds
    pub(crate) idle_hard_timeout_secs: u64,

    /// How often the idle condition is checked
    pub(crate) idle_poll_interval_ms: u64,

    /// Timeout in seconds for navigation and network subscription
    pub(crate) navigation_timeout_secs: u64,

    /// Timeout in seconds for each selector wait and page evaluation
    pub(crate) selector_timeout_secs: u64,

    /// Deadline for the whole run, browser launch included
    ///
    /// Default: 60 seconds
    pub(crate) overall_deadline_secs: u64,

    /// Per-stylesheet HTTP timeout
    pub(crate) download_timeout_secs: u64,

    /// Element the client-side application mounts into
    pub(crate) root_selector: String,

    /// Additional selectors that must be visible with at least one match
    pub(crate) required_selectors: Vec<String>,

    pub(crate) headless: bool,
    pub(crate) user_agent: String,

    /// Chrome profile directory; a fresh temporary one is used when unset
    pub(crate) chrome_data_dir: Option<PathBuf>,
}
