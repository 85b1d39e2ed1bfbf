//! Type definitions for stylesheet capture

use serde::Serialize;
use std::path::PathBuf;

/// One stylesheet response paired with its output location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylesheetReference {
    /// URL the browser actually fetched; always the download source
    pub response_url: String,
    /// `href` as written in the `<link>` at the same position, if any
    pub authored_href: Option<String>,
    /// Path relative to the output directory, under `css/`
    pub resolved_relative_path: PathBuf,
}

/// Error information for a failed stylesheet download
#[derive(Debug, Clone, Serialize)]
pub struct StyleDownloadFailure {
    pub url: String,
    pub error: String,
}

/// Result of stylesheet downloading with success and failure tracking
#[derive(Debug, Clone, Default, Serialize)]
pub struct StyleDownloadReport {
    pub downloaded: Vec<PathBuf>,
    pub failures: Vec<StyleDownloadFailure>,
}

impl StyleDownloadReport {
    /// Total number of stylesheets attempted
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.failures.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
