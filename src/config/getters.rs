//! Getter methods for `CaptureConfig`
//!
//! Timing fields are stored as integers for serialization and exposed as
//! `Duration`s.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::CaptureConfig;
use crate::network_idle::IdleConfig;
use crate::snapshot::SnapshotOptions;
use crate::utils::RENDERED_HTML_FILE;

impl CaptureConfig {
    #[must_use]
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Location of the rendered document inside the output directory
    #[must_use]
    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(RENDERED_HTML_FILE)
    }

    #[must_use]
    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }

    #[must_use]
    pub fn idle_hard_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_hard_timeout_secs)
    }

    #[must_use]
    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval_ms)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }

    #[must_use]
    pub fn overall_deadline(&self) -> Duration {
        Duration::from_secs(self.overall_deadline_secs)
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    #[must_use]
    pub fn root_selector(&self) -> &str {
        &self.root_selector
    }

    #[must_use]
    pub fn required_selectors(&self) -> &[String] {
        &self.required_selectors
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&Path> {
        self.chrome_data_dir.as_deref()
    }

    #[must_use]
    pub fn idle_config(&self) -> IdleConfig {
        IdleConfig {
            idle_window: self.idle_window(),
            hard_timeout: self.idle_hard_timeout(),
            poll_interval: self.idle_poll_interval(),
        }
    }

    #[must_use]
    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            idle: self.idle_config(),
            root_selector: self.root_selector.clone(),
            required_selectors: self.required_selectors.clone(),
            navigation_timeout: self.navigation_timeout(),
            selector_timeout: self.selector_timeout(),
        }
    }
}
