//! Network-idle detection
//!
//! A single "load" event says nothing about single-page applications that
//! keep fetching data and lazy images after mount. Instead the detector
//! counts in-flight requests from the live event stream and declares the
//! page settled once the count has been zero for a full idle window. A hard
//! timeout bounds the wait for pages that poll forever.
//!
//! Event consumption and the poll ticker share one task through
//! `tokio::select!`, so [`NetworkActivityState`] is plain owned data.

use futures::{Stream, StreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::capture_engine::{CaptureError, CaptureResult};
use crate::page_session::NetworkActivity;
use crate::utils::constants::{
    DEFAULT_IDLE_HARD_TIMEOUT_SECS, DEFAULT_IDLE_POLL_INTERVAL_MS, DEFAULT_IDLE_WINDOW_MS,
};

/// Timing parameters for [`wait_for_network_idle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleConfig {
    /// Quiet period required with zero requests in flight
    pub idle_window: Duration,
    /// Absolute ceiling on the whole wait
    pub hard_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            idle_window: Duration::from_millis(DEFAULT_IDLE_WINDOW_MS),
            hard_timeout: Duration::from_secs(DEFAULT_IDLE_HARD_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_IDLE_POLL_INTERVAL_MS),
        }
    }
}

/// In-flight request ids and last-activity timestamp for one detector call.
///
/// Requests are keyed by id: CDP repeats `requestWillBeSent` with the same id
/// for every redirect hop but sends a single `loadingFinished`, and a request
/// issued before subscription can report completion without a start.
#[derive(Debug, Clone)]
pub struct NetworkActivityState {
    in_flight: HashSet<String>,
    completed: HashSet<String>,
    last_activity: Instant,
}

impl NetworkActivityState {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            in_flight: HashSet::new(),
            completed: HashSet::new(),
            last_activity: now,
        }
    }

    /// Apply one lifecycle event observed at `now`.
    pub fn observe(&mut self, event: &NetworkActivity, now: Instant) {
        match event {
            NetworkActivity::RequestStarted { request_id } => {
                // A start that arrives after its own completion is stale
                if !self.completed.contains(request_id) {
                    self.in_flight.insert(request_id.clone());
                }
                self.last_activity = now;
            }
            NetworkActivity::RequestFinished { request_id }
            | NetworkActivity::RequestFailed { request_id } => {
                self.in_flight.remove(request_id);
                self.completed.insert(request_id.clone());
                self.last_activity = now;
            }
            NetworkActivity::ResponseReceived { .. } => {}
        }
    }

    #[must_use]
    pub fn is_idle(&self, now: Instant, idle_window: Duration) -> bool {
        self.in_flight.is_empty() && now.saturating_duration_since(self.last_activity) >= idle_window
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }
}

/// Wait until the network has been quiet for `config.idle_window`.
///
/// Takes ownership of the event subscription; it is dropped, and with it the
/// browser-side listener, on every return path.
///
/// # Errors
/// * `CaptureError::IdleTimeout` once `config.hard_timeout` has elapsed
/// * `CaptureError::Cancelled` as soon as `cancel` fires
pub async fn wait_for_network_idle<S>(
    mut events: S,
    config: &IdleConfig,
    cancel: &CancellationToken,
) -> CaptureResult<()>
where
    S: Stream<Item = NetworkActivity> + Unpin,
{
    let start = Instant::now();
    let mut state = NetworkActivityState::new(start);

    let hard_deadline = tokio::time::sleep_until(start + config.hard_timeout);
    tokio::pin!(hard_deadline);

    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut events_open = true;

    debug!(
        "Waiting for network idle (window {:?}, hard timeout {:?})",
        config.idle_window, config.hard_timeout
    );

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("Network idle wait cancelled after {:?}", start.elapsed());
                return Err(CaptureError::Cancelled);
            }

            () = &mut hard_deadline => {
                return Err(CaptureError::IdleTimeout {
                    elapsed: start.elapsed(),
                    in_flight: state.in_flight(),
                });
            }

            event = events.next(), if events_open => match event {
                Some(event) => {
                    state.observe(&event, Instant::now());
                    trace!("{:?} -> {} in flight", event, state.in_flight());
                }
                None => {
                    // Source went away; the counter can only be judged as-is from here
                    debug!("Network event stream closed with {} in flight", state.in_flight());
                    events_open = false;
                }
            },

            _ = ticker.tick() => {
                if state.is_idle(Instant::now(), config.idle_window) {
                    debug!("Network idle after {:?}", start.elapsed());
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> NetworkActivity {
        NetworkActivity::RequestStarted {
            request_id: id.to_string(),
        }
    }

    fn finished(id: &str) -> NetworkActivity {
        NetworkActivity::RequestFinished {
            request_id: id.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counter_never_goes_negative() {
        let now = Instant::now();
        let mut state = NetworkActivityState::new(now);

        state.observe(&finished("1"), now);
        state.observe(
            &NetworkActivity::RequestFailed {
                request_id: "2".to_string(),
            },
            now,
        );
        assert_eq!(state.in_flight(), 0);

        state.observe(&started("3"), now);
        assert_eq!(state.in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_hops_count_once() {
        let now = Instant::now();
        let mut state = NetworkActivityState::new(now);

        state.observe(&started("doc"), now);
        state.observe(&started("doc"), now);
        assert_eq!(state.in_flight(), 1);

        state.observe(&finished("doc"), now);
        assert_eq!(state.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_completion_is_ignored() {
        let t0 = Instant::now();
        let mut state = NetworkActivityState::new(t0);

        state.observe(&finished("late"), t0);
        tokio::time::advance(Duration::from_millis(10)).await;
        state.observe(&started("late"), Instant::now());

        assert_eq!(state.in_flight(), 0);
        assert_eq!(state.last_activity(), Instant::now());
    }

    #[tokio::test(start_paused = true)]
    async fn test_responses_do_not_count_as_activity() {
        let t0 = Instant::now();
        let mut state = NetworkActivityState::new(t0);

        tokio::time::advance(Duration::from_millis(700)).await;
        state.observe(
            &NetworkActivity::ResponseReceived {
                request_id: "1".to_string(),
                kind: crate::page_session::ResourceKind::Stylesheet,
                url: "https://example.com/a.css".to_string(),
            },
            Instant::now(),
        );

        assert_eq!(state.last_activity(), t0);
        assert!(state.is_idle(Instant::now(), Duration::from_millis(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_requires_zero_in_flight() {
        let t0 = Instant::now();
        let mut state = NetworkActivityState::new(t0);
        state.observe(&started("1"), t0);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!state.is_idle(Instant::now(), Duration::from_secs(1)));

        state.observe(&finished("1"), Instant::now());
        assert!(!state.is_idle(Instant::now(), Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(state.is_idle(Instant::now(), Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_page_settles_after_one_window() {
        let config = IdleConfig {
            idle_window: Duration::from_millis(500),
            ..IdleConfig::default()
        };
        let cancel = CancellationToken::new();
        let start = Instant::now();

        wait_for_network_idle(futures::stream::pending(), &config, &cancel)
            .await
            .expect("quiet page should settle");

        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }
}
