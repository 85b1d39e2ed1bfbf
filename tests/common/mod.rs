//! Test utilities shared by the rendersnap integration tests

use anyhow::Result;
use futures::StreamExt;
use kodegen_tools_rendersnap::capture_engine::{CaptureError, CaptureResult};
use kodegen_tools_rendersnap::page_session::{
    NetworkActivity, NetworkEventStream, PageSession, ResourceKind, WaitState,
};
use kodegen_tools_rendersnap::style_capture::Downloader;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 1x1 transparent PNG
#[allow(dead_code)]
pub const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// One scripted event, delivered `delay` after the previous one
pub type TimedEvent = (Duration, NetworkActivity);

#[allow(dead_code)]
pub fn started(id: &str) -> NetworkActivity {
    NetworkActivity::RequestStarted {
        request_id: id.to_string(),
    }
}

#[allow(dead_code)]
pub fn finished(id: &str) -> NetworkActivity {
    NetworkActivity::RequestFinished {
        request_id: id.to_string(),
    }
}

#[allow(dead_code)]
pub fn failed(id: &str) -> NetworkActivity {
    NetworkActivity::RequestFailed {
        request_id: id.to_string(),
    }
}

#[allow(dead_code)]
pub fn stylesheet_response(id: &str, url: &str) -> NetworkActivity {
    NetworkActivity::ResponseReceived {
        request_id: id.to_string(),
        kind: ResourceKind::Stylesheet,
        url: url.to_string(),
    }
}

/// Stream that replays `events` with their delays, then stays open.
#[allow(dead_code)]
pub fn scripted_stream(events: Vec<TimedEvent>) -> NetworkEventStream {
    let replay = futures::stream::unfold(VecDeque::from(events), |mut queue| async move {
        let (delay, event) = queue.pop_front()?;
        tokio::time::sleep(delay).await;
        Some((event, queue))
    });
    replay.chain(futures::stream::pending()).boxed()
}

/// Scripted stand-in for a live browser page.
///
/// Each `subscribe_network` call takes the next queued event script (an
/// empty, open stream once they run out). Evaluations are answered from a
/// map keyed by the exact expression; element counts default to 1.
#[derive(Default)]
pub struct FakeSession {
    subscriptions: Mutex<VecDeque<Vec<TimedEvent>>>,
    responses: HashMap<String, Value>,
    counts: HashMap<String, u64>,
    missing_selectors: HashSet<String>,
    fail_navigation: bool,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(self, events: Vec<TimedEvent>) -> Self {
        self.subscriptions
            .lock()
            .expect("subscriptions lock")
            .push_back(events);
        self
    }

    pub fn with_response(mut self, expression: &str, value: Value) -> Self {
        self.responses.insert(expression.to_string(), value);
        self
    }

    pub fn with_count(mut self, selector: &str, count: u64) -> Self {
        self.counts.insert(selector.to_string(), count);
        self
    }

    pub fn with_missing_selector(mut self, selector: &str) -> Self {
        self.missing_selectors.insert(selector.to_string());
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    /// Calls in the order they were made, e.g. `navigate https://...`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn count_for(&self, expression: &str) -> Option<u64> {
        let rest = expression.strip_prefix("document.querySelectorAll(")?;
        let literal = rest.strip_suffix(").length")?;
        let selector: String = serde_json::from_str(literal).ok()?;
        Some(self.counts.get(&selector).copied().unwrap_or(1))
    }
}

impl PageSession for FakeSession {
    async fn subscribe_network(&self) -> CaptureResult<NetworkEventStream> {
        self.record("subscribe".to_string());
        let events = self
            .subscriptions
            .lock()
            .expect("subscriptions lock")
            .pop_front()
            .unwrap_or_default();
        Ok(scripted_stream(events))
    }

    async fn navigate(&self, url: &str) -> CaptureResult<()> {
        self.record(format!("navigate {url}"));
        if self.fail_navigation {
            return Err(CaptureError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> CaptureResult<()> {
        self.record(format!("wait {selector} {state:?}"));
        if self.missing_selectors.contains(selector) {
            return Err(CaptureError::Selector {
                selector: selector.to_string(),
                message: format!("not {state:?} after {timeout:?}"),
            });
        }
        Ok(())
    }

    async fn evaluate_value(&self, expression: &str) -> CaptureResult<Value> {
        if let Some(count) = self.count_for(expression) {
            self.record("count".to_string());
            return Ok(Value::from(count));
        }
        self.record("evaluate".to_string());
        self.responses
            .get(expression)
            .cloned()
            .ok_or_else(|| CaptureError::Evaluation("no scripted response".to_string()))
    }
}

/// Downloader that writes a marker file instead of fetching
#[derive(Default)]
pub struct RecordingDownloader {
    failing: HashSet<String>,
    stalling: HashMap<String, CancellationToken>,
    requests: Mutex<Vec<(String, PathBuf)>>,
}

#[allow(dead_code)]
impl RecordingDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Requests for `url` fire `cancel` and then never complete
    pub fn stalling_on(mut self, url: &str, cancel: CancellationToken) -> Self {
        self.stalling.insert(url.to_string(), cancel);
        self
    }

    pub fn requests(&self) -> Vec<(String, PathBuf)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Downloader for RecordingDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((url.to_string(), dest.to_path_buf()));
        if let Some(cancel) = self.stalling.get(url) {
            cancel.cancel();
            std::future::pending::<()>().await;
        }
        if self.failing.contains(url) {
            anyhow::bail!("bad status: 404 Not Found");
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, format!("/* {url} */")).await?;
        Ok(())
    }
}
