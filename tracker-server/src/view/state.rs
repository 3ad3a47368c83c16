//! Tracker view state.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{Line, Position, Transportation};
use crate::feed::{ConvertedSnapshot, FeedError};

use super::markers::{MapView, ReconcileStats};
use super::notifications::{NotificationConfig, Notifications};
use super::selection::{Selection, distinct_lines};

/// View state shared between the poller and the web handlers.
pub type SharedView = Arc<RwLock<TrackerView>>;

/// The result of one fetch, tagged with the order it was started in.
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: Result<ConvertedSnapshot, FeedError>,
}

/// What the view did with a fetch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// New snapshot is displayed.
    Snapshot { vehicles: usize },
    /// Fetch failed; previous snapshot kept and a notification raised.
    Failed { notification: u64 },
    /// A later-started fetch already completed; outcome ignored.
    Stale,
}

/// The vehicles from the last successful fetch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub vehicles: Vec<Transportation>,
    pub lines: BTreeSet<Line>,
    pub skipped: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    fn from_converted(converted: ConvertedSnapshot) -> Self {
        Self {
            lines: distinct_lines(&converted.vehicles),
            vehicles: converted.vehicles,
            skipped: converted.skipped,
            fetched_at: Some(Utc::now()),
        }
    }
}

/// Everything the map page shows: snapshot, selection, markers, errors.
///
/// Every change to the snapshot or the selection rebuilds the marker layer
/// from the visible vehicles.
pub struct TrackerView {
    snapshot: Snapshot,
    selection: Selection,
    map: MapView,
    notifications: Notifications,
    /// Highest sequence number whose outcome has been applied.
    applied_seq: u64,
    /// Highest sequence number started.
    started_seq: u64,
}

impl TrackerView {
    /// Create an empty view centred on `center`.
    pub fn new(center: Position, notifications: &NotificationConfig) -> Self {
        Self {
            snapshot: Snapshot::default(),
            selection: Selection::new(),
            map: MapView::new(center),
            notifications: Notifications::new(notifications),
            applied_seq: 0,
            started_seq: 0,
        }
    }

    /// Wrap in the shared handle used by the poller and web layer.
    pub fn shared(self) -> SharedView {
        Arc::new(RwLock::new(self))
    }

    /// Record that fetch `seq` has started.
    pub fn begin_fetch(&mut self, seq: u64) {
        self.started_seq = self.started_seq.max(seq);
    }

    /// Record that fetch `seq` was aborted before it delivered an outcome.
    pub fn abandon_fetch(&mut self, seq: u64) {
        if seq == self.started_seq {
            self.started_seq = self.applied_seq;
        }
    }

    /// Whether a fetch newer than the displayed data is outstanding.
    pub fn is_loading(&self) -> bool {
        self.started_seq > self.applied_seq
    }

    /// Apply a fetch outcome unless a later-started fetch already won.
    pub async fn apply_fetch(&mut self, outcome: FetchOutcome) -> Applied {
        if outcome.seq <= self.applied_seq {
            debug!(
                seq = outcome.seq,
                applied = self.applied_seq,
                "Ignoring stale fetch outcome"
            );
            return Applied::Stale;
        }
        self.applied_seq = outcome.seq;
        self.started_seq = self.started_seq.max(outcome.seq);

        match outcome.result {
            Ok(converted) => {
                self.snapshot = Snapshot::from_converted(converted);
                let stats = self.rebuild_markers();
                info!(
                    seq = outcome.seq,
                    vehicles = self.snapshot.vehicles.len(),
                    lines = self.snapshot.lines.len(),
                    skipped = self.snapshot.skipped,
                    markers_removed = stats.removed,
                    markers_added = stats.added,
                    "Snapshot applied"
                );
                Applied::Snapshot {
                    vehicles: self.snapshot.vehicles.len(),
                }
            }
            Err(e) => {
                warn!(seq = outcome.seq, error = %e, "Fetch failed, keeping previous snapshot");
                let id = self
                    .notifications
                    .raise(format!("Could not refresh vehicle positions: {e}"), e.status())
                    .await;
                Applied::Failed { notification: id }
            }
        }
    }

    fn rebuild_markers(&mut self) -> ReconcileStats {
        let visible = self.selection.visible_vehicles(&self.snapshot.vehicles);
        self.map.reconcile(visible)
    }

    /// Replace the line search text.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.selection.set_search(text);
    }

    /// Toggle a line in the selection and rebuild markers.
    pub fn toggle_line(&mut self, line: Line) -> bool {
        let selected = self.selection.toggle(line);
        self.rebuild_markers();
        selected
    }

    /// Clear the line selection and rebuild markers.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.rebuild_markers();
    }

    /// Lines matching the search text.
    pub fn visible_lines(&self) -> Vec<&Line> {
        self.selection.visible_lines(&self.snapshot.lines)
    }

    /// Vehicles passing the line selection.
    pub fn visible_vehicles(&self) -> Vec<&Transportation> {
        self.selection.visible_vehicles(&self.snapshot.vehicles)
    }

    /// All vehicles on `line`, regardless of selection.
    pub fn vehicles_on_line(&self, line: &Line) -> Vec<&Transportation> {
        self.snapshot
            .vehicles
            .iter()
            .filter(|v| &v.line == line)
            .collect()
    }

    /// Vehicles on `line` within `range_km` of `from`.
    pub fn vehicles_near(&self, line: &Line, from: &Position, range_km: f64) -> Vec<&Transportation> {
        self.vehicles_on_line(line)
            .into_iter()
            .filter(|v| v.position.distance_km(from) <= range_km)
            .collect()
    }

    pub fn vehicle(&self, id: &str) -> Option<&Transportation> {
        self.snapshot.vehicles.iter().find(|v| v.id == id)
    }

    /// Centre the map on a vehicle's current position.
    ///
    /// Returns false if the vehicle is not in the snapshot.
    pub fn focus_vehicle(&mut self, id: &str) -> bool {
        let Some(vehicle) = self.vehicle(id).cloned() else {
            return false;
        };
        self.map.focus(&vehicle);
        true
    }

    /// Show the user's location and centre on it.
    pub fn locate(&mut self, position: Position) {
        self.map.locate(position);
    }

    pub async fn dismiss_notification(&self, id: u64) -> bool {
        self.notifications.dismiss(id).await
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }
}
