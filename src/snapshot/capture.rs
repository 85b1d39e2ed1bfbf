//! DOM snapshot sequencing
//!
//! Drives one page from navigation to a written, self-contained HTML file:
//! 1. Enable network event observation
//! 2. Navigate
//! 3. Wait for `body`
//! 4. Wait for network idle
//! 5. Wait for the root marker (and any required selectors)
//! 6. Read doctype + outer HTML from the live DOM
//! 7. Pretty-print
//! 8. Extract data URIs, pretty-print again, write
//!
//! Every step must finish before the next starts; the first failure aborts.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::pretty_print::pretty_print;
use crate::capture_engine::page_timeout::cancellable_step;
use crate::capture_engine::{CaptureError, CaptureResult, CaptureSummary};
use crate::data_uri::extract_and_replace;
use crate::network_idle::{IdleConfig, wait_for_network_idle};
use crate::page_session::js_scripts::{SNAPSHOT_SCRIPT, selector_count_script};
use crate::page_session::{PageSession, WaitState, evaluate_as};
use crate::utils::constants::{
    ASSET_DIR_NAME, DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_ROOT_SELECTOR,
    DEFAULT_SELECTOR_TIMEOUT_SECS,
};

/// Headroom over the session's own selector timeout, so its more specific
/// `Selector` error wins the race.
const SELECTOR_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Canonical post-render document as read from the page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderedDocument {
    pub doctype: Option<String>,
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
}

impl RenderedDocument {
    /// Doctype line (if any) followed by the root element markup
    #[must_use]
    pub fn to_markup(&self) -> String {
        match &self.doctype {
            Some(doctype) => format!("{doctype}\n{}", self.outer_html),
            None => self.outer_html.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub idle: IdleConfig,
    /// Element the client-side app mounts into
    pub root_selector: String,
    /// Extra selectors that must be visible and match at least one element
    pub required_selectors: Vec<String>,
    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            idle: IdleConfig::default(),
            root_selector: DEFAULT_ROOT_SELECTOR.to_string(),
            required_selectors: Vec::new(),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            selector_timeout: Duration::from_secs(DEFAULT_SELECTOR_TIMEOUT_SECS),
        }
    }
}

async fn wait_visible<S: PageSession>(
    session: &S,
    selector: &str,
    options: &SnapshotOptions,
    cancel: &CancellationToken,
) -> CaptureResult<()> {
    cancellable_step(
        cancel,
        session.wait_for_selector(selector, WaitState::Visible, options.selector_timeout),
        options.selector_timeout + SELECTOR_TIMEOUT_GRACE,
        &format!("Wait for {selector}"),
    )
    .await
}

/// Capture `url` into `out_file`, extracting embedded payloads into an
/// `assets` directory next to it.
///
/// # Errors
/// Navigation, evaluation, selector, idle-timeout and cancellation errors
/// abort the capture. Individual assets that cannot be decoded or written
/// are left inline and do not fail the call.
pub async fn capture<S: PageSession>(
    session: &S,
    url: &str,
    out_file: &Path,
    options: &SnapshotOptions,
    cancel: &CancellationToken,
) -> CaptureResult<CaptureSummary> {
    let events = cancellable_step(
        cancel,
        session.subscribe_network(),
        options.navigation_timeout,
        "Enable network events",
    )
    .await?;

    info!("Navigating to {url}");
    cancellable_step(
        cancel,
        session.navigate(url),
        options.navigation_timeout,
        "Page navigation",
    )
    .await?;

    cancellable_step(
        cancel,
        session.wait_for_selector("body", WaitState::Ready, options.selector_timeout),
        options.selector_timeout + SELECTOR_TIMEOUT_GRACE,
        "Wait for body",
    )
    .await?;

    wait_for_network_idle(events, &options.idle, cancel).await?;

    wait_visible(session, &options.root_selector, options, cancel).await?;

    for selector in &options.required_selectors {
        wait_visible(session, selector, options, cancel).await?;
        let count: u64 = cancellable_step(
            cancel,
            evaluate_as(session, &selector_count_script(selector)),
            options.selector_timeout,
            "Count elements",
        )
        .await?;
        if count == 0 {
            return Err(CaptureError::Selector {
                selector: selector.clone(),
                message: "no matching elements".to_string(),
            });
        }
        info!("Found {count} {selector} elements");
    }

    let document: RenderedDocument = cancellable_step(
        cancel,
        evaluate_as(session, SNAPSHOT_SCRIPT),
        options.selector_timeout,
        "Snapshot evaluation",
    )
    .await?;
    debug!(
        "Captured {} bytes of rendered markup (doctype: {})",
        document.outer_html.len(),
        document.doctype.as_deref().unwrap_or("none")
    );

    finalize_snapshot(&document.to_markup(), out_file).await
}

/// Steps 7-8: pretty-print, extract data URIs, pretty-print again, write.
///
/// # Errors
/// Only directory creation and the final write can fail.
pub async fn finalize_snapshot(raw_html: &str, out_file: &Path) -> CaptureResult<CaptureSummary> {
    let out_dir = out_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let asset_dir = out_dir.join(ASSET_DIR_NAME);
    tokio::fs::create_dir_all(&asset_dir).await?;

    let raw_html = raw_html.to_string();
    let blocking_asset_dir = asset_dir.clone();
    let (final_html, assets_saved) = tokio::task::spawn_blocking(move || {
        let pretty = pretty_print(&raw_html);
        let outcome = extract_and_replace(&pretty, &blocking_asset_dir);
        // Substitution changes line lengths; format once more
        (pretty_print(&outcome.html), outcome.saved)
    })
    .await
    .map_err(|e| CaptureError::Other(format!("Snapshot post-processing failed: {e}")))?;

    tokio::fs::write(out_file, final_html.as_bytes()).await?;

    info!(
        "Saved {} base64 assets to {}/ and rendered HTML to {}",
        assets_saved,
        asset_dir.display(),
        out_file.display()
    );

    Ok(CaptureSummary {
        html_path: out_file.to_path_buf(),
        asset_dir,
        assets_saved,
        html_bytes: final_html.len(),
    })
}
