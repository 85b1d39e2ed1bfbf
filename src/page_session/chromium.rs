//! [`PageSession`] over a chromiumoxide `Page`.

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    EventResponseReceived, ResourceType,
};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::js_scripts::selector_probe_script;
use super::{NetworkActivity, NetworkEventStream, PageSession, ResourceKind, WaitState};
use crate::capture_engine::{CaptureError, CaptureResult};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Live chromiumoxide page driven through the [`PageSession`] contract.
#[derive(Clone)]
pub struct ChromiumSession {
    page: Page,
}

impl ChromiumSession {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }
}

fn browser_error(e: impl std::fmt::Display) -> CaptureError {
    CaptureError::Browser(e.to_string())
}

fn resource_kind(resource_type: &ResourceType) -> ResourceKind {
    match resource_type {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Script => ResourceKind::Script,
        _ => ResourceKind::Other,
    }
}

impl PageSession for ChromiumSession {
    async fn subscribe_network(&self) -> CaptureResult<NetworkEventStream> {
        // Listeners go in before Network.enable so nothing fired in between is lost
        let started = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkActivity::RequestStarted {
                request_id: e.request_id.inner().clone(),
            });
        let responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkActivity::ResponseReceived {
                request_id: e.request_id.inner().clone(),
                kind: resource_kind(&e.r#type),
                url: e.response.url.clone(),
            });
        let finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkActivity::RequestFinished {
                request_id: e.request_id.inner().clone(),
            });
        let failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkActivity::RequestFailed {
                request_id: e.request_id.inner().clone(),
            });

        self.page
            .execute(EnableParams::default())
            .await
            .map_err(browser_error)?;
        debug!("Network events enabled");

        Ok(futures::stream::select_all([
            started.boxed(),
            responses.boxed(),
            finished.boxed(),
            failed.boxed(),
        ])
        .boxed())
    }

    async fn navigate(&self, url: &str) -> CaptureResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| CaptureError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> CaptureResult<()> {
        let probe = selector_probe_script(selector, state == WaitState::Visible);
        let start = Instant::now();

        loop {
            match self.page.evaluate(probe.as_str()).await {
                Ok(result) => {
                    if result.into_value::<bool>().unwrap_or(false) {
                        debug!(
                            "Selector '{}' {:?} after {:.2}s",
                            selector,
                            state,
                            start.elapsed().as_secs_f64()
                        );
                        return Ok(());
                    }
                }
                Err(e) => {
                    // Execution context is replaced during navigation; retry
                    trace!("Selector probe for '{}' failed: {}, retrying", selector, e);
                }
            }

            if start.elapsed() >= timeout {
                return Err(CaptureError::Selector {
                    selector: selector.to_string(),
                    message: format!("not {state:?} after {timeout:?}"),
                });
            }

            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn evaluate_value(&self, expression: &str) -> CaptureResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| CaptureError::Evaluation(e.to_string()))?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|e| CaptureError::Evaluation(format!("Failed to read script result: {e}")))
    }
}
