//! Browser discovery and launch
//!
//! Locates a local Chrome/Chromium (or downloads a managed build), launches
//! it with the configured user agent, and wraps the browser together with its
//! CDP handler task so both are torn down together.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

const CDP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn candidate_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        let roots = ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
            .iter()
            .filter_map(|var| std::env::var_os(var).map(PathBuf::from));
        roots
            .flat_map(|root| {
                [
                    root.join(r"Google\Chrome\Application\chrome.exe"),
                    root.join(r"Chromium\Application\chrome.exe"),
                ]
            })
            .collect()
    } else if cfg!(target_os = "macos") {
        let mut paths: Vec<PathBuf> = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
            "/opt/homebrew/bin/chromium",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
            paths.push(home.join("Applications/Chromium.app/Contents/MacOS/Chromium"));
        }
        paths
    } else {
        [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    }
}

/// Find a Chrome/Chromium executable.
///
/// `CHROMIUM_PATH` wins when it points at an existing file; then the
/// platform's usual install locations; then `which` on Unix.
///
/// # Errors
/// Returns an error when nothing is found.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("CHROMIUM_PATH").map(PathBuf::from) {
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    if let Some(path) = candidate_paths().into_iter().find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
///
/// # Errors
/// Fails if the cache directory cannot be created or the fetch fails.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen-rendersnap")
        .join("chromium");

    info!("Downloading managed Chromium into {}", cache_dir.display());
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );
    Ok(revision_info.executable_path)
}

/// A launched browser plus the task pumping its CDP connection.
///
/// Call [`BrowserSession::shutdown`] to close Chrome cleanly. Dropping the
/// session instead aborts the handler and removes any temporary profile.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// Profile directory to delete on shutdown; `None` when caller-owned
    temp_profile: Option<PathBuf>,
}

impl BrowserSession {
    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Open a new tab at `url`.
    ///
    /// # Errors
    /// Fails if the browser refuses to create the target.
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        self.browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to open page at {url}"))
    }

    /// Close Chrome, wait for the process to exit, and remove the temporary
    /// profile.
    pub async fn shutdown(mut self) {
        info!("Shutting down browser");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
        }
        self.handler.abort();
        self.cleanup_temp_profile();
    }

    fn cleanup_temp_profile(&mut self) {
        if let Some(path) = self.temp_profile.take()
            && let Err(e) = std::fs::remove_dir_all(&path)
        {
            warn!(
                "Failed to clean up profile directory {}: {e}",
                path.display()
            );
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Browser::drop kills the Chrome process
        self.handler.abort();
        self.cleanup_temp_profile();
    }
}

fn is_benign_handler_error(message: &str) -> bool {
    // chromiumoxide cannot decode every CDP event newer Chrome builds emit
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Find or download a browser and launch it.
///
/// Without `chrome_data_dir` a per-process temporary profile is created and
/// removed again on shutdown.
///
/// # Errors
/// Fails if no browser can be found or fetched, or if Chrome does not start.
pub async fn launch_browser(
    headless: bool,
    chrome_data_dir: Option<&Path>,
    user_agent: &str,
) -> Result<BrowserSession> {
    let chrome_path = match find_browser_executable() {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}; falling back to a managed download");
            download_managed_browser().await?
        }
    };

    let (user_data_dir, temp_profile) = match chrome_data_dir {
        Some(dir) => (dir.to_path_buf(), None),
        None => {
            let dir = std::env::temp_dir()
                .join(format!("kodegen_rendersnap_{}", std::process::id()));
            (dir.clone(), Some(dir))
        }
    };
    tokio::fs::create_dir_all(&user_data_dir)
        .await
        .context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(CDP_REQUEST_TIMEOUT)
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    config_builder = if headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    let browser_config = config_builder
        .arg(format!("--user-agent={user_agent}"))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-extensions")
        .arg("--disable-notifications")
        .arg("--disable-popup-blocking")
        .arg("--disable-breakpad")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching browser (headless: {headless})");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_handler_error(&message) {
                    trace!("Suppressed CDP decode error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok(BrowserSession {
        browser,
        handler,
        temp_profile,
    })
}
