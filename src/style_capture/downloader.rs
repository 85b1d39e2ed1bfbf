//! Plain HTTP download of already-known URLs to disk

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::utils::constants::{CHROME_USER_AGENT, DEFAULT_DOWNLOAD_TIMEOUT_SECS};

/// Fetch `url` into `dest`, creating parent directories.
pub trait Downloader: Send + Sync {
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// reqwest-backed [`Downloader`] with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Downloader with the default browser user agent and timeout
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            CHROME_USER_AGENT,
            Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        )
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let response = self
            .client
            .get(url)
            .header("Accept", "text/css,*/*;q=0.1")
            .send()
            .await
            .with_context(|| format!("Failed to request {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("bad status: {}", response.status()));
        }

        write_atomically(response.bytes_stream(), dest).await
    }
}

/// Stream `chunks` into `dest` through a sibling `.part` file.
///
/// `dest` only ever appears complete; on error or cancellation the partial
/// file is removed and an existing `dest` is left as it was.
async fn write_atomically<S, B, E>(mut chunks: S, dest: &Path) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let file_name = dest
        .file_name()
        .with_context(|| format!("No file name in {}", dest.display()))?;
    let mut part_name = file_name.to_os_string();
    part_name.push(".part");
    let part = dest.with_file_name(part_name);

    let mut guard = PartFile {
        path: part,
        committed: false,
    };
    let mut file = tokio::fs::File::create(&guard.path)
        .await
        .with_context(|| format!("Failed to create {}", guard.path.display()))?;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.context("Failed to read response chunk")?;
        file.write_all(chunk.as_ref()).await?;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&guard.path, dest)
        .await
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;
    guard.committed = true;
    Ok(())
}

/// Removes an unfinished `.part` file on error or when the download is dropped.
struct PartFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn chunk(text: &str) -> io::Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_complete_body_lands_at_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("app.css");
        let chunks = futures::stream::iter(vec![chunk("body{"), chunk("margin:0}")]);

        write_atomically(chunks, &dest).await.expect("write");

        assert_eq!(std::fs::read_to_string(&dest).expect("css"), "body{margin:0}");
        assert!(!dir.path().join("app.css.part").exists());
    }

    #[tokio::test]
    async fn test_broken_body_leaves_no_truncated_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("app.css");
        let chunks = futures::stream::iter(vec![
            chunk("body{"),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]);

        let err = write_atomically(chunks, &dest)
            .await
            .expect_err("stream error must fail");

        assert!(format!("{err:#}").contains("reset"));
        assert!(!dest.exists());
        assert!(!dir.path().join("app.css.part").exists());
    }

    #[tokio::test]
    async fn test_broken_body_keeps_previous_copy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("app.css");
        std::fs::write(&dest, ".old{}").expect("seed");
        let chunks = futures::stream::iter(vec![Err::<Vec<u8>, _>(io::Error::other("eof"))]);

        write_atomically(chunks, &dest)
            .await
            .expect_err("stream error must fail");

        assert_eq!(std::fs::read_to_string(&dest).expect("css"), ".old{}");
    }
}
