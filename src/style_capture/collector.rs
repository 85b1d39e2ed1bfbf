//! Background collection of stylesheet response URLs

use futures::{FutureExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::page_session::{NetworkActivity, NetworkEventStream, ResourceKind};

/// Records the URL of every stylesheet response, in arrival order, for as
/// long as it is alive.
///
/// Runs on its own subscription so it never competes with the idle detector
/// for events. Dropping the collector stops the task.
pub struct StylesheetCollector {
    guard: DropGuard,
    handle: JoinHandle<Vec<String>>,
}

fn stylesheet_url(event: NetworkActivity) -> Option<String> {
    match event {
        NetworkActivity::ResponseReceived {
            kind: ResourceKind::Stylesheet,
            url,
            ..
        } => Some(url),
        _ => None,
    }
}

impl StylesheetCollector {
    #[must_use]
    pub fn spawn(mut events: NetworkEventStream) -> Self {
        let stop = CancellationToken::new();
        let task_stop = stop.clone();

        let handle = tokio::spawn(async move {
            let mut urls = Vec::new();
            loop {
                tokio::select! {
                    biased;

                    () = task_stop.cancelled() => {
                        // Keep whatever was already delivered
                        while let Some(Some(event)) = events.next().now_or_never() {
                            urls.extend(stylesheet_url(event));
                        }
                        break;
                    }
                    event = events.next() => match event {
                        Some(event) => {
                            if let Some(url) = stylesheet_url(event) {
                                log::debug!("Captured stylesheet response {url}");
                                urls.push(url);
                            }
                        }
                        None => break,
                    },
                }
            }
            urls
        });

        Self {
            guard: stop.drop_guard(),
            handle,
        }
    }

    /// Stop collecting and return the stylesheet URLs seen so far.
    pub async fn finish(self) -> Vec<String> {
        drop(self.guard);
        match self.handle.await {
            Ok(urls) => urls,
            Err(e) => {
                log::warn!("Stylesheet collector task failed: {e}");
                Vec::new()
            }
        }
    }
}
