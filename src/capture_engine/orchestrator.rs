//! Whole-run sequencing: DOM snapshot, then stylesheets.
//!
//! [`capture_site`] works against any [`PageSession`] and [`Downloader`];
//! [`run_capture`] wires it to a real browser and HTTP client and enforces
//! the overall deadline.

use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::page_timeout::{cancellable_step, with_page_timeout};
use super::{CaptureError, CaptureReport, CaptureResult};
use crate::browser_setup::{BrowserSession, launch_browser};
use crate::config::CaptureConfig;
use crate::page_session::js_scripts::{
    DYNAMIC_STYLES_SCRIPT, INLINE_STYLES_SCRIPT, STYLESHEET_HREFS_SCRIPT,
};
use crate::page_session::{ChromiumSession, PageSession, evaluate_as};
use crate::snapshot;
use crate::style_capture::{
    Downloader, HttpDownloader, StylesheetCollector, download_stylesheets, reconcile_stylesheets,
    save_numbered_styles,
};
use crate::utils::constants::{DYNAMIC_DIR_NAME, INLINE_DIR_NAME};

/// Capture the configured page through `session` and save its styles.
///
/// # Errors
/// Anything that aborts the snapshot aborts the run, as does failing to read
/// inline styles or link hrefs. Stylesheet download failures and a failed
/// dynamic-style read are logged and reported, not returned.
pub async fn capture_site<S, D>(
    session: &S,
    downloader: &D,
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> CaptureResult<CaptureReport>
where
    S: PageSession,
    D: Downloader,
{
    let start = Instant::now();
    let url = config.target_url();
    let output_dir = config.output_dir();
    let step_timeout = config.selector_timeout();

    tokio::fs::create_dir_all(output_dir).await?;

    // Separate subscription so the idle detector keeps its own stream
    let stylesheet_events = cancellable_step(
        cancel,
        session.subscribe_network(),
        config.navigation_timeout(),
        "Enable stylesheet tracking",
    )
    .await?;
    let collector = StylesheetCollector::spawn(stylesheet_events);

    let snapshot = snapshot::capture(
        session,
        url,
        &config.html_path(),
        &config.snapshot_options(),
        cancel,
    )
    .await?;

    let inline_styles: Vec<String> = cancellable_step(
        cancel,
        evaluate_as(session, INLINE_STYLES_SCRIPT),
        step_timeout,
        "Inline style extraction",
    )
    .await?;
    let authored_hrefs: Vec<Option<String>> = cancellable_step(
        cancel,
        evaluate_as(session, STYLESHEET_HREFS_SCRIPT),
        step_timeout,
        "Stylesheet href extraction",
    )
    .await?;
    let stylesheet_urls = collector.finish().await;
    info!(
        "Found {} inline styles, {} stylesheet links, {} stylesheet responses",
        inline_styles.len(),
        authored_hrefs.len(),
        stylesheet_urls.len()
    );

    let inline_paths = save_numbered_styles(
        &output_dir.join(INLINE_DIR_NAME),
        "inline_style",
        &inline_styles,
    )
    .await;

    let references = reconcile_stylesheets(&stylesheet_urls, &authored_hrefs);
    let downloads = download_stylesheets(&references, output_dir, downloader, cancel).await;
    if cancel.is_cancelled() {
        return Err(CaptureError::Cancelled);
    }
    if downloads.has_failures() {
        warn!(
            "{} of {} stylesheets failed to download",
            downloads.failures.len(),
            downloads.total()
        );
    }

    let dynamic_paths = match cancellable_step(
        cancel,
        evaluate_as::<_, Vec<String>>(session, DYNAMIC_STYLES_SCRIPT),
        step_timeout,
        "Dynamic style extraction",
    )
    .await
    {
        Ok(styles) => {
            save_numbered_styles(&output_dir.join(DYNAMIC_DIR_NAME), "dynamic_style", &styles)
                .await
        }
        Err(e) if e.is_cancelled() => return Err(e),
        Err(e) => {
            warn!("Failed to extract dynamic styles: {e}");
            Vec::new()
        }
    };

    let report = CaptureReport {
        url: url.to_string(),
        snapshot,
        stylesheets: downloads.downloaded,
        stylesheet_failures: downloads
            .failures
            .into_iter()
            .map(|f| format!("{}: {}", f.url, f.error))
            .collect(),
        inline_styles: inline_paths,
        dynamic_styles: dynamic_paths,
        elapsed: start.elapsed(),
    };

    info!(
        "Captured {} in {:.2}s ({} assets, {} stylesheets, {} inline, {} dynamic)",
        report.url,
        report.elapsed.as_secs_f64(),
        report.snapshot.assets_saved,
        report.stylesheets.len(),
        report.inline_styles.len(),
        report.dynamic_styles.len()
    );

    Ok(report)
}

async fn open_and_capture(
    browser: &BrowserSession,
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> CaptureResult<CaptureReport> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| CaptureError::Browser(format!("{e:#}")))?;
    let session = ChromiumSession::new(page);
    let downloader = HttpDownloader::new(config.user_agent(), config.download_timeout())?;
    capture_site(&session, &downloader, config, cancel).await
}

/// Launch a browser, capture the configured page, and shut the browser down.
///
/// The whole run, launch included, is bounded by the configured overall
/// deadline.
///
/// # Errors
/// Browser launch failures plus everything [`capture_site`] returns.
pub async fn run_capture(
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> CaptureResult<CaptureReport> {
    let deadline = Instant::now() + config.overall_deadline();

    let browser = cancellable_step(
        cancel,
        async {
            launch_browser(config.headless(), config.chrome_data_dir(), config.user_agent())
                .await
                .map_err(|e| CaptureError::Browser(format!("{e:#}")))
        },
        config.overall_deadline(),
        "Browser launch",
    )
    .await?;

    let result = with_page_timeout(
        open_and_capture(&browser, config, cancel),
        deadline.saturating_duration_since(Instant::now()),
        "Capture",
    )
    .await;

    browser.shutdown().await;
    result
}
