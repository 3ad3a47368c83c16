//! Periodic snapshot polling.
//!
//! Fetches a fresh snapshot on a fixed interval (first fetch immediately)
//! and hands each outcome to the view. Every fetch is numbered; the view
//! only applies an outcome newer than the last one it applied, so a slow
//! early request can never overwrite a later one.
//!
//! The loop runs as a spawned task owned by a [`PollerHandle`]. Stopping or
//! dropping the handle stops the timer, aborts any in-flight fetch and
//! discards results that arrive afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::feed::PositionSource;
use crate::view::{FetchOutcome, SharedView};

/// Default time between fetches.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// What to do when a tick fires while the previous fetch is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Abort the running fetch and start a new one.
    CancelInFlight,
    /// Let the running fetch finish and skip this tick.
    SkipWhileInFlight,
}

/// Configuration for the poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between fetches.
    pub interval: Duration,

    /// Behaviour on overlapping fetches.
    pub overlap: OverlapPolicy,
}

impl PollerConfig {
    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the overlap policy.
    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            overlap: OverlapPolicy::CancelInFlight,
        }
    }
}

/// Polls a position source and feeds the view.
pub struct Poller<S> {
    source: Arc<S>,
    view: SharedView,
    config: PollerConfig,
}

impl<S: PositionSource> Poller<S> {
    /// Create a poller. Nothing runs until [`Poller::spawn`].
    pub fn new(source: S, view: SharedView, config: PollerConfig) -> Self {
        Self {
            source: Arc::new(source),
            view,
            config,
        }
    }

    /// Start polling on a background task.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));

        PollerHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (outcome_tx, mut outcome_rx) = mpsc::channel::<FetchOutcome>(8);
        let mut next_seq: u64 = 0;
        let mut in_flight: Option<(u64, JoinHandle<()>)> = None;

        info!(
            interval_secs = self.config.interval.as_secs_f64(),
            overlap = ?self.config.overlap,
            "Poller started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Some((seq, handle)) = in_flight.take() {
                        match self.config.overlap {
                            OverlapPolicy::CancelInFlight => {
                                handle.abort();
                                debug!(seq, "Cancelled in-flight fetch");
                            }
                            OverlapPolicy::SkipWhileInFlight => {
                                debug!(seq, "Fetch still in flight, skipping tick");
                                in_flight = Some((seq, handle));
                            }
                        }
                    }

                    if in_flight.is_none() {
                        next_seq += 1;
                        in_flight = Some((next_seq, self.start_fetch(next_seq, outcome_tx.clone()).await));
                    }
                }
                Some(outcome) = outcome_rx.recv() => {
                    if in_flight.as_ref().is_some_and(|(seq, _)| *seq == outcome.seq) {
                        in_flight = None;
                    }
                    let applied = self.view.write().await.apply_fetch(outcome).await;
                    debug!(?applied, "Fetch outcome handled");
                }
            }
        }

        if let Some((seq, handle)) = in_flight.take() {
            handle.abort();
            self.view.write().await.abandon_fetch(seq);
            debug!(seq, "Aborted in-flight fetch on shutdown");
        }
        info!("Poller stopped");
    }

    async fn start_fetch(&self, seq: u64, outcome_tx: mpsc::Sender<FetchOutcome>) -> JoinHandle<()> {
        self.view.write().await.begin_fetch(seq);
        debug!(seq, "Starting fetch");

        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let result = source.fetch_snapshot().await;
            // Receiver is gone once the poller has stopped
            let _ = outcome_tx.send(FetchOutcome { seq, result }).await;
        })
    }
}

/// Owner of a running poller task.
///
/// Dropping the handle stops the poller.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling and wait for the task to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        // The loop aborts its in-flight fetch on the way out
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::{Line, Position, Transportation};
    use crate::feed::{ConvertedSnapshot, FeedError};
    use crate::view::{NotificationConfig, TrackerView};

    type Step = (Duration, Result<ConvertedSnapshot, FeedError>);

    /// Source that replays scripted responses, each after a delay.
    /// Once the script runs out, fetches never complete.
    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                steps: Mutex::new(steps.into()),
                calls: Arc::clone(&calls),
            };
            (source, calls)
        }
    }

    impl PositionSource for ScriptedSource {
        async fn fetch_snapshot(&self) -> Result<ConvertedSnapshot, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some((delay, result)) => {
                    tokio::time::sleep(delay).await;
                    result
                }
                None => std::future::pending().await,
            }
        }
    }

    fn vehicle(id: &str) -> Transportation {
        Transportation {
            id: id.to_string(),
            timestamp: "t".to_string(),
            side_number: "1".to_string(),
            trip_id: "RA1".to_string(),
            line: Line::parse("24").unwrap(),
            position: Position { lat: 52.2, lng: 21.0 },
        }
    }

    fn snapshot(ids: &[&str]) -> Result<ConvertedSnapshot, FeedError> {
        Ok(ConvertedSnapshot {
            vehicles: ids.iter().map(|id| vehicle(id)).collect(),
            skipped: 0,
        })
    }

    fn server_error() -> Result<ConvertedSnapshot, FeedError> {
        Err(FeedError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        })
    }

    fn shared_view() -> SharedView {
        let center = Position::new(52.2297, 21.0122).unwrap();
        TrackerView::new(center, &NotificationConfig::default()).shared()
    }

    async fn marker_ids(view: &SharedView) -> Vec<String> {
        view.read()
            .await
            .map()
            .markers()
            .map(|m| m.id.clone())
            .collect()
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.overlap, OverlapPolicy::CancelInFlight);
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_is_immediate() {
        let (source, calls) = ScriptedSource::new(vec![(secs(0), snapshot(&["bus:1"]))]);
        let view = shared_view();
        let handle = Poller::new(source, view.clone(), PollerConfig::default()).spawn();

        tokio::time::sleep(secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(marker_ids(&view).await, vec!["bus:1"]);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_markers_and_polling_continues() {
        let (source, calls) = ScriptedSource::new(vec![
            (secs(0), snapshot(&["bus:1", "bus:2"])),
            (secs(0), server_error()),
            (secs(0), snapshot(&["bus:3"])),
        ]);
        let view = shared_view();
        let handle = Poller::new(source, view.clone(), PollerConfig::default()).spawn();

        tokio::time::sleep(secs(11)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(marker_ids(&view).await, vec!["bus:1", "bus:2"]);
        assert_eq!(view.read().await.notifications().active().len(), 1);

        tokio::time::sleep(secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(marker_ids(&view).await, vec!["bus:3"]);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_policy_lets_newest_fetch_win() {
        let (source, calls) = ScriptedSource::new(vec![
            (secs(15), snapshot(&["old"])),
            (secs(1), snapshot(&["new"])),
        ]);
        let view = shared_view();
        let handle = Poller::new(source, view.clone(), PollerConfig::default()).spawn();

        tokio::time::sleep(secs(12)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(marker_ids(&view).await, vec!["new"]);

        // The first fetch would have finished by now had it not been aborted
        tokio::time::sleep(secs(6)).await;
        assert_eq!(marker_ids(&view).await, vec!["new"]);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn skip_policy_waits_for_running_fetch() {
        let (source, calls) = ScriptedSource::new(vec![
            (secs(15), snapshot(&["slow"])),
            (secs(0), snapshot(&["next"])),
        ]);
        let view = shared_view();
        let config = PollerConfig::default().with_overlap(OverlapPolicy::SkipWhileInFlight);
        let handle = Poller::new(source, view.clone(), config).spawn();

        tokio::time::sleep(secs(12)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(view.read().await.is_loading());

        tokio::time::sleep(secs(4)).await;
        assert_eq!(marker_ids(&view).await, vec!["slow"]);

        tokio::time::sleep(secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(marker_ids(&view).await, vec!["next"]);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_result() {
        let (source, calls) = ScriptedSource::new(vec![(secs(5), snapshot(&["late"]))]);
        let view = shared_view();
        let handle = Poller::new(source, view.clone(), PollerConfig::default()).spawn();

        tokio::time::sleep(secs(1)).await;
        assert!(view.read().await.is_loading());
        handle.stop().await;
        assert!(!view.read().await.is_loading());

        tokio::time::sleep(secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(marker_ids(&view).await.is_empty());
        assert!(!view.read().await.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_polling() {
        let (source, calls) = ScriptedSource::new(vec![
            (secs(0), snapshot(&["bus:1"])),
            (secs(0), snapshot(&["bus:2"])),
        ]);
        let view = shared_view();
        let handle = Poller::new(source, view.clone(), PollerConfig::default()).spawn();

        tokio::time::sleep(secs(1)).await;
        drop(handle);

        tokio::time::sleep(secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(marker_ids(&view).await, vec!["bus:1"]);
        assert!(!view.read().await.is_loading());
    }
}
