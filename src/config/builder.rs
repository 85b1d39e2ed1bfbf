//! Type-safe builder for `CaptureConfig` using the typestate pattern
//!
//! `build()` only exists once a target URL has been supplied.

use anyhow::{Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::CaptureConfig;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_IDLE_HARD_TIMEOUT_SECS,
    DEFAULT_IDLE_POLL_INTERVAL_MS, DEFAULT_IDLE_WINDOW_MS, DEFAULT_NAVIGATION_TIMEOUT_SECS,
    DEFAULT_OUTPUT_DIR, DEFAULT_OVERALL_DEADLINE_SECS, DEFAULT_ROOT_SELECTOR,
    DEFAULT_SELECTOR_TIMEOUT_SECS, is_valid_url,
};

// Type states for the builder
pub struct WithTargetUrl;

pub struct CaptureConfigBuilder<State = ()> {
    pub(crate) target_url: Option<String>,
    pub(crate) output_dir: PathBuf,
    pub(crate) idle_window_ms: u64,
    pub(crate) idle_hard_timeout_secs: u64,
    pub(crate) idle_poll_interval_ms: u64,
    pub(crate) navigation_timeout_secs: u64,
    pub(crate) selector_timeout_secs: u64,
    pub(crate) overall_deadline_secs: u64,
    pub(crate) download_timeout_secs: u64,
    pub(crate) root_selector: String,
    pub(crate) required_selectors: Vec<String>,
    pub(crate) headless: bool,
    pub(crate) user_agent: String,
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CaptureConfigBuilder<()> {
    fn default() -> Self {
        Self {
            target_url: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            idle_window_ms: DEFAULT_IDLE_WINDOW_MS,
            idle_hard_timeout_secs: DEFAULT_IDLE_HARD_TIMEOUT_SECS,
            idle_poll_interval_ms: DEFAULT_IDLE_POLL_INTERVAL_MS,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            selector_timeout_secs: DEFAULT_SELECTOR_TIMEOUT_SECS,
            overall_deadline_secs: DEFAULT_OVERALL_DEADLINE_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            root_selector: DEFAULT_ROOT_SELECTOR.to_string(),
            required_selectors: Vec::new(),
            headless: true,
            user_agent: CHROME_USER_AGENT.to_string(),
            chrome_data_dir: None,
            _phantom: PhantomData,
        }
    }
}

impl CaptureConfig {
    /// Create a builder for configuring a `CaptureConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CaptureConfigBuilder<()> {
        CaptureConfigBuilder::default()
    }
}

impl CaptureConfigBuilder<()> {
    pub fn target_url(self, url: impl Into<String>) -> CaptureConfigBuilder<WithTargetUrl> {
        let url_string = url.into().trim().to_string();

        // Normalize URL: add https:// if no scheme is present
        let normalized_url = if url_string.contains("://") {
            url_string
        } else {
            format!("https://{url_string}")
        };

        CaptureConfigBuilder {
            target_url: Some(normalized_url),
            output_dir: self.output_dir,
            idle_window_ms: self.idle_window_ms,
            idle_hard_timeout_secs: self.idle_hard_timeout_secs,
            idle_poll_interval_ms: self.idle_poll_interval_ms,
            navigation_timeout_secs: self.navigation_timeout_secs,
            selector_timeout_secs: self.selector_timeout_secs,
            overall_deadline_secs: self.overall_deadline_secs,
            download_timeout_secs: self.download_timeout_secs,
            root_selector: self.root_selector,
            required_selectors: self.required_selectors,
            headless: self.headless,
            user_agent: self.user_agent,
            chrome_data_dir: self.chrome_data_dir,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl CaptureConfigBuilder<WithTargetUrl> {
    /// # Errors
    /// Rejects non-http(s) URLs, an idle window that does not fit inside the
    /// hard timeout, a zero poll interval or timeout, and an empty root
    /// selector.
    pub fn build(self) -> Result<CaptureConfig> {
        let target_url = self
            .target_url
            .ok_or_else(|| anyhow!("target_url is required"))?;
        if !is_valid_url(&target_url) {
            bail!("target_url must be an absolute http(s) URL, got '{target_url}'");
        }

        if self.idle_poll_interval_ms == 0 {
            bail!("idle_poll_interval_ms must be greater than zero");
        }
        if self.idle_window_ms >= self.idle_hard_timeout_secs.saturating_mul(1000) {
            bail!(
                "idle window ({} ms) must be shorter than the idle hard timeout ({} s)",
                self.idle_window_ms,
                self.idle_hard_timeout_secs
            );
        }
        for (name, value) in [
            ("navigation_timeout_secs", self.navigation_timeout_secs),
            ("selector_timeout_secs", self.selector_timeout_secs),
            ("overall_deadline_secs", self.overall_deadline_secs),
            ("download_timeout_secs", self.download_timeout_secs),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }

        let root_selector = self.root_selector.trim().to_string();
        if root_selector.is_empty() {
            bail!("root_selector must not be empty");
        }

        let required_selectors = self
            .required_selectors
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(CaptureConfig {
            target_url,
            output_dir: self.output_dir,
            idle_window_ms: self.idle_window_ms,
            idle_hard_timeout_secs: self.idle_hard_timeout_secs,
            idle_poll_interval_ms: self.idle_poll_interval_ms,
            navigation_timeout_secs: self.navigation_timeout_secs,
            selector_timeout_secs: self.selector_timeout_secs,
            overall_deadline_secs: self.overall_deadline_secs,
            download_timeout_secs: self.download_timeout_secs,
            root_selector,
            required_selectors,
            headless: self.headless,
            user_agent: self.user_agent,
            chrome_data_dir: self.chrome_data_dir,
        })
    }
}
