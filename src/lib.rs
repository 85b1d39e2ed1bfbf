pub mod browser_setup;
pub mod capture_engine;
pub mod config;
pub mod data_uri;
pub mod network_idle;
pub mod page_session;
pub mod snapshot;
pub mod style_capture;
pub mod utils;

pub use browser_setup::{
    BrowserSession, download_managed_browser, find_browser_executable, launch_browser,
};
pub use capture_engine::{
    CaptureError, CaptureReport, CaptureResult, CaptureSummary, capture_site, run_capture,
};
pub use config::CaptureConfig;
pub use data_uri::{AssetRecord, AssetStore, ExtractionOutcome, extract_and_replace};
pub use network_idle::{IdleConfig, NetworkActivityState, wait_for_network_idle};
pub use page_session::{ChromiumSession, NetworkActivity, PageSession, ResourceKind, WaitState};
pub use snapshot::{RenderedDocument, SnapshotOptions, capture, pretty_print};
pub use style_capture::{Downloader, HttpDownloader, StylesheetReference};
