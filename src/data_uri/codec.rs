//! Extract `data:<mime>;base64,<payload>` occurrences into asset files.
//!
//! The scan is a plain pattern substitution over the raw text; no HTML is
//! parsed, so payloads inside attributes, inline CSS and scripts are all
//! handled alike.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::mime_ext::guess_extension;
use crate::utils::constants::ASSET_DIR_NAME;

// Accepts mixed case and + . - in the type, e.g. image/svg+xml, image/vnd.microsoft.icon
static DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"data:([a-zA-Z0-9.+\-/]+);base64,([A-Za-z0-9+/=]+)")
        .expect("Invalid data URI regex")
});

/// Hex characters of the payload digest kept in file names
const HASH_PREFIX_LEN: usize = 12;

/// One distinct payload written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    /// First 12 hex chars of SHA-256 over the base64 text
    pub content_hash: String,
    pub mime_type: String,
    pub extension: String,
    /// Forward-slash path written into the HTML, e.g. `assets/b64_<hash>.png`
    pub relative_path: String,
}

/// Result of one extraction pass
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub html: String,
    /// Distinct assets newly written by this pass
    pub saved: usize,
    pub assets: Vec<AssetRecord>,
}

/// Stable content hash of a base64 payload
#[must_use]
pub fn content_hash(payload_b64: &str) -> String {
    let digest = Sha256::digest(payload_b64.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(HASH_PREFIX_LEN);
    hex
}

/// Hash-to-asset map plus the directory assets are written to.
///
/// [`extract_and_replace`] uses a fresh store per call. Keeping one store
/// across calls extends dedup to every document it processes.
#[derive(Debug)]
pub struct AssetStore {
    asset_dir: PathBuf,
    seen: HashMap<String, AssetRecord>,
}

impl AssetStore {
    #[must_use]
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            seen: HashMap::new(),
        }
    }

    #[must_use]
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Number of distinct payloads known to this store
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    #[must_use]
    pub fn get(&self, content_hash: &str) -> Option<&AssetRecord> {
        self.seen.get(content_hash)
    }

    /// Rewrite every data URI in `html` to a relative asset path.
    ///
    /// Occurrences that fail to decode or write are left exactly as they
    /// were; the rest of the document is still processed.
    pub fn extract_and_replace(&mut self, html: &str) -> ExtractionOutcome {
        if html.is_empty() {
            return ExtractionOutcome {
                html: String::new(),
                saved: 0,
                assets: Vec::new(),
            };
        }

        let mut assets = Vec::new();

        let processed = DATA_URI_RE.replace_all(html, |caps: &Captures| {
            match self.resolve_occurrence(&caps[1], &caps[2]) {
                Some((record, newly_written)) => {
                    let relative = record.relative_path.clone();
                    if newly_written {
                        assets.push(record);
                    }
                    relative
                }
                None => caps[0].to_string(),
            }
        });

        ExtractionOutcome {
            html: processed.into_owned(),
            saved: assets.len(),
            assets,
        }
    }

    /// Returns the record and whether it was written by this occurrence.
    fn resolve_occurrence(&mut self, mime: &str, payload: &str) -> Option<(AssetRecord, bool)> {
        let hash = content_hash(payload);
        if let Some(existing) = self.seen.get(&hash) {
            return Some((existing.clone(), false));
        }

        let bytes = match STANDARD.decode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Skipping undecodable data URI ({mime}, hash {hash}): {e}");
                return None;
            }
        };

        let mime_type = mime.to_ascii_lowercase();
        let extension = guess_extension(&mime_type);
        let filename = format!("b64_{hash}{extension}");
        let out_path = self.asset_dir.join(&filename);

        if let Err(e) = std::fs::write(&out_path, &bytes) {
            log::warn!("Failed to write asset {}: {e}", out_path.display());
            return None;
        }

        log::debug!(
            "Extracted {} byte {} payload to {}",
            bytes.len(),
            mime_type,
            out_path.display()
        );

        let record = AssetRecord {
            content_hash: hash.clone(),
            mime_type,
            extension: extension.to_string(),
            relative_path: format!("{ASSET_DIR_NAME}/{filename}"),
        };
        self.seen.insert(hash, record.clone());
        Some((record, true))
    }
}

/// Extract every base64 data URI in `html` into `asset_dir`, deduplicating
/// by payload within this call, and return the rewritten document.
#[must_use]
pub fn extract_and_replace(html: &str, asset_dir: &Path) -> ExtractionOutcome {
    AssetStore::new(asset_dir).extract_and_replace(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_content_hash_is_short_and_stable() {
        let a = content_hash(PNG_B64);
        let b = content_hash(PNG_B64);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, content_hash("R0lGODlhAQABAAAAACw="));
    }

    #[test]
    fn test_empty_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = extract_and_replace("", dir.path());
        assert_eq!(outcome.html, "");
        assert_eq!(outcome.saved, 0);
    }

    #[test]
    fn test_single_png_is_extracted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let html = format!(r#"<img src="data:image/png;base64,{PNG_B64}" alt="dot">"#);

        let outcome = extract_and_replace(&html, dir.path());

        let hash = content_hash(PNG_B64);
        assert_eq!(outcome.saved, 1);
        assert_eq!(
            outcome.html,
            format!(r#"<img src="assets/b64_{hash}.png" alt="dot">"#)
        );

        let written = std::fs::read(dir.path().join(format!("b64_{hash}.png"))).expect("asset");
        assert_eq!(written, STANDARD.decode(PNG_B64).expect("decode"));
        assert_eq!(outcome.assets[0].mime_type, "image/png");
    }

    #[test]
    fn test_uppercase_mime_is_normalised() {
        let dir = tempfile::tempdir().expect("tempdir");
        let html = format!("url(data:IMAGE/PNG;base64,{PNG_B64})");

        let outcome = extract_and_replace(&html, dir.path());

        assert_eq!(outcome.saved, 1);
        assert!(outcome.html.ends_with(".png)"));
    }

    #[test]
    fn test_store_dedups_across_calls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = AssetStore::new(dir.path());
        let html = format!(r#"<img src="data:image/png;base64,{PNG_B64}">"#);

        let first = store.extract_and_replace(&html);
        let second = store.extract_and_replace(&html);

        assert_eq!(first.saved, 1);
        assert_eq!(second.saved, 0);
        assert_eq!(first.html, second.html);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_write_failure_leaves_text_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("does-not-exist");
        let html = format!(r#"<img src="data:image/png;base64,{PNG_B64}">"#);

        let outcome = extract_and_replace(&html, &missing);

        assert_eq!(outcome.html, html);
        assert_eq!(outcome.saved, 0);
    }
}
