//! Browser session capability set.
//!
//! The capture logic only ever talks to a [`PageSession`]: navigate, wait for
//! a selector, evaluate an expression, and subscribe to network lifecycle
//! events. [`ChromiumSession`] implements it over a chromiumoxide `Page`;
//! tests substitute a scripted fake.

pub mod chromium;
pub mod js_scripts;

use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

use crate::capture_engine::{CaptureError, CaptureResult};

pub use chromium::ChromiumSession;

/// Resource classification reported with a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Script,
    Other,
}

/// A network lifecycle event, stripped down to what capture needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkActivity {
    RequestStarted { request_id: String },
    ResponseReceived {
        request_id: String,
        kind: ResourceKind,
        url: String,
    },
    RequestFinished { request_id: String },
    RequestFailed { request_id: String },
}

/// Events delivered from the moment of subscription; dropping the stream
/// unregisters the listener.
pub type NetworkEventStream = BoxStream<'static, NetworkActivity>;

/// How far along an element must be before a selector wait succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Present in the DOM
    Ready,
    /// Present and laid out with a non-empty box
    Visible,
}

pub trait PageSession: Send + Sync {
    /// Enable network observation and return a fresh event subscription.
    fn subscribe_network(&self) -> impl Future<Output = CaptureResult<NetworkEventStream>> + Send;

    fn navigate(&self, url: &str) -> impl Future<Output = CaptureResult<()>> + Send;

    fn wait_for_selector(
        &self,
        selector: &str,
        state: WaitState,
        timeout: Duration,
    ) -> impl Future<Output = CaptureResult<()>> + Send;

    /// Evaluate a JavaScript expression in the page and return its JSON value.
    fn evaluate_value(
        &self,
        expression: &str,
    ) -> impl Future<Output = CaptureResult<serde_json::Value>> + Send;
}

/// Evaluate an expression and decode the result into `T`.
pub async fn evaluate_as<S, T>(session: &S, expression: &str) -> CaptureResult<T>
where
    S: PageSession + ?Sized,
    T: DeserializeOwned,
{
    let value = session.evaluate_value(expression).await?;
    serde_json::from_value(value)
        .map_err(|e| CaptureError::Evaluation(format!("Failed to decode script result: {e}")))
}
