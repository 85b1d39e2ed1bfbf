//! Pairs captured stylesheet responses with authored `<link>` hrefs and
//! mirrors them under `css/`.

use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::downloader::Downloader;
use super::types::{StyleDownloadFailure, StyleDownloadReport, StylesheetReference};
use crate::utils::constants::CSS_DIR_NAME;

/// Base used to pull a path component out of relative hrefs.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Synthetic file name for stylesheet `index` (0-based) when no usable path exists
#[must_use]
pub fn fallback_stylesheet_name(index: usize) -> String {
    format!("external_css_{}.css", index + 1)
}

/// Split the path component of `raw` into safe, decoded segments.
///
/// Returns `None` when the string has no path beyond the root.
fn path_segments(raw: &str) -> Option<Vec<String>> {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).ok()?.join(raw).ok()?
        }
        Err(e) => {
            log::debug!("Unparseable stylesheet reference '{raw}': {e}");
            return None;
        }
    };

    let segments: Vec<String> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| {
            urlencoding::decode(s)
                .map(std::borrow::Cow::into_owned)
                .unwrap_or_else(|_| s.to_string())
        })
        .filter(|s| !s.contains('/') && !s.contains('\\') && s != "." && s != "..")
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

/// Output path (relative to the output directory) for stylesheet `index`.
///
/// The authored href is used whenever one exists at that index, even if it is
/// empty; otherwise the response URL is used. An empty or root-only path
/// yields `css/external_css_<index+1>.css`.
#[must_use]
pub fn derive_stylesheet_path(
    index: usize,
    response_url: &str,
    authored_href: Option<&str>,
) -> PathBuf {
    let source = authored_href.unwrap_or(response_url).trim();

    let mut path = PathBuf::from(CSS_DIR_NAME);
    match path_segments(source) {
        Some(segments) => path.extend(segments),
        None => path.push(fallback_stylesheet_name(index)),
    }
    path
}

/// Build one [`StylesheetReference`] per captured response, matching authored
/// hrefs by position.
#[must_use]
pub fn reconcile_stylesheets(
    response_urls: &[String],
    authored_hrefs: &[Option<String>],
) -> Vec<StylesheetReference> {
    response_urls
        .iter()
        .enumerate()
        .map(|(i, response_url)| {
            let authored_href = authored_hrefs.get(i).cloned().flatten();
            let resolved_relative_path =
                derive_stylesheet_path(i, response_url, authored_href.as_deref());
            StylesheetReference {
                response_url: response_url.clone(),
                authored_href,
                resolved_relative_path,
            }
        })
        .collect()
}

/// Download every reference from its response URL into `output_dir`.
///
/// Failures are logged and recorded; remaining entries are still processed.
/// Cancellation abandons the download in progress and skips the rest.
pub async fn download_stylesheets<D: Downloader>(
    references: &[StylesheetReference],
    output_dir: &Path,
    downloader: &D,
    cancel: &CancellationToken,
) -> StyleDownloadReport {
    let mut report = StyleDownloadReport::default();

    for reference in references {
        let dest = output_dir.join(&reference.resolved_relative_path);
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::info!(
                    "Stylesheet downloads cancelled with {} of {} done",
                    report.total(),
                    references.len()
                );
                break;
            }
            outcome = downloader.download(&reference.response_url, &dest) => outcome,
        };
        match outcome {
            Ok(()) => {
                log::info!(
                    "Downloaded external CSS {} to {}",
                    reference.response_url,
                    dest.display()
                );
                report.downloaded.push(dest);
            }
            Err(e) => {
                log::warn!(
                    "Failed to download external CSS {}: {e:#}",
                    reference.response_url
                );
                report.failures.push(StyleDownloadFailure {
                    url: reference.response_url.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    report
}
