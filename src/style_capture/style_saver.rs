//! Persist inline and dynamic CSS fragments as numbered files

use std::path::{Path, PathBuf};

/// Write each fragment to `<dir>/<prefix>_<n>.css`, numbering from 1.
///
/// Every occurrence gets its own file, duplicates included. Failures are
/// logged and skipped; the paths actually written are returned.
pub async fn save_numbered_styles(dir: &Path, prefix: &str, styles: &[String]) -> Vec<PathBuf> {
    if styles.is_empty() {
        return Vec::new();
    }

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        log::warn!("Failed to create CSS directory {}: {e}", dir.display());
        return Vec::new();
    }

    let mut saved = Vec::with_capacity(styles.len());
    for (i, style) in styles.iter().enumerate() {
        let filename = dir.join(format!("{prefix}_{}.css", i + 1));
        match tokio::fs::write(&filename, style.as_bytes()).await {
            Ok(()) => {
                log::debug!("Saved {prefix} {} to {}", i + 1, filename.display());
                saved.push(filename);
            }
            Err(e) => log::warn!("Failed to save {prefix} {}: {e}", i + 1),
        }
    }

    log::info!("Saved {} {prefix} files to {}", saved.len(), dir.display());
    saved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicates_get_separate_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inline = dir.path().join("inline");
        let styles = vec![
            "body { margin: 0 }".to_string(),
            "body { margin: 0 }".to_string(),
            ".a { color: red }".to_string(),
        ];

        let saved = save_numbered_styles(&inline, "inline_style", &styles).await;

        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0], inline.join("inline_style_1.css"));
        assert_eq!(saved[2], inline.join("inline_style_3.css"));
        assert_eq!(
            std::fs::read_to_string(inline.join("inline_style_2.css")).expect("read"),
            "body { margin: 0 }"
        );
    }

    #[tokio::test]
    async fn test_nothing_written_for_empty_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dynamic = dir.path().join("dynamic");

        let saved = save_numbered_styles(&dynamic, "dynamic_style", &[]).await;

        assert!(saved.is_empty());
        assert!(!dynamic.exists());
    }
}
