//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;

use super::builder::CaptureConfigBuilder;

impl<State> CaptureConfigBuilder<State> {
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the quiet period required before the page counts as settled
    ///
    /// Must stay below the idle hard timeout; `build()` rejects it otherwise.
    #[must_use]
    pub fn idle_window_ms(mut self, ms: u64) -> Self {
        self.idle_window_ms = ms;
        self
    }

    #[must_use]
    pub fn idle_hard_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_hard_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn idle_poll_interval_ms(mut self, ms: u64) -> Self {
        self.idle_poll_interval_ms = ms;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn selector_timeout_secs(mut self, secs: u64) -> Self {
        self.selector_timeout_secs = secs;
        self
    }

    /// Set the deadline for the whole run
    ///
    /// Covers browser launch, capture and stylesheet downloads. When it
    /// expires the run fails with a timeout error and the browser is closed.
    #[must_use]
    pub fn overall_deadline_secs(mut self, secs: u64) -> Self {
        self.overall_deadline_secs = secs;
        self
    }

    #[must_use]
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.download_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn root_selector(mut self, selector: impl Into<String>) -> Self {
        self.root_selector = selector.into();
        self
    }

    /// Require `selector` to be visible and match at least one element
    /// before the DOM is captured
    #[must_use]
    pub fn require_selector(mut self, selector: impl Into<String>) -> Self {
        self.required_selectors.push(selector.into());
        self
    }

    #[must_use]
    pub fn required_selectors(mut self, selectors: Vec<String>) -> Self {
        self.required_selectors = selectors;
        self
    }

    /// Set browser headless mode
    ///
    /// Headed mode needs a display server and is mainly useful for watching
    /// a capture while debugging selectors.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chrome_data_dir = Some(dir.into());
        self
    }
}
