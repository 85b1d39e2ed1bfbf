//! Shared configuration constants for rendersnap
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Quiet period with zero in-flight requests before a page counts as settled.
///
/// One second covers the usual burst of post-mount data fetches and lazy
/// images on single-page applications. Raise it for pages that stagger
/// requests further apart.
pub const DEFAULT_IDLE_WINDOW_MS: u64 = 1000;

/// Absolute ceiling for the network-idle wait.
///
/// Pages with perpetual background polling never go quiet; this bounds
/// the wait so such pages fail with an idle timeout instead of hanging.
pub const DEFAULT_IDLE_HARD_TIMEOUT_SECS: u64 = 30;

/// Interval between idle checks.
pub const DEFAULT_IDLE_POLL_INTERVAL_MS: u64 = 50;

/// Timeout for `page.goto()`
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Timeout for each selector wait (`body`, root marker, required selectors)
pub const DEFAULT_SELECTOR_TIMEOUT_SECS: u64 = 30;

/// Deadline for the whole capture run, browser launch included.
pub const DEFAULT_OVERALL_DEADLINE_SECS: u64 = 60;

/// Timeout for each external stylesheet download
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 10;

/// Root element client-side frameworks mount into (Vue, React templates).
pub const DEFAULT_ROOT_SELECTOR: &str = "#app";

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// File name of the final pretty-printed, asset-rewritten document
pub const RENDERED_HTML_FILE: &str = "rendered_after_js.html";

/// Sub-directory for extracted data-URI payloads.
///
/// Also the prefix of the relative paths written back into the HTML, so the
/// rendered document must live directly in the parent of this directory.
pub const ASSET_DIR_NAME: &str = "assets";

/// Sub-directory mirroring the source site's stylesheet paths
pub const CSS_DIR_NAME: &str = "css";

/// Sub-directory for `<style>` block contents
pub const INLINE_DIR_NAME: &str = "inline";

/// Sub-directory for `style="..."` attribute values
pub const DYNAMIC_DIR_NAME: &str = "dynamic";

/// Chrome user agent string presented by the headless browser and downloader
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Chrome releases new stable versions ~every 4 weeks.
/// Update quarterly to stay within reasonable version window.
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
