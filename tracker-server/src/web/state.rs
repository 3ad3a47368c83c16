//! Application state for the web layer.

use std::time::Duration;

use crate::domain::Position;
use crate::view::SharedView;

/// Shared application state.
///
/// Owns the one `TrackerView` the poller writes into and the handlers read.
#[derive(Clone)]
pub struct AppState {
    /// Map view state
    pub view: SharedView,

    /// Initial map centre
    pub default_center: Position,

    /// How often the page re-reads the view
    pub refresh_interval: Duration,
}

impl AppState {
    /// Create a new app state.
    pub fn new(view: SharedView, default_center: Position, refresh_interval: Duration) -> Self {
        Self {
            view,
            default_center,
            refresh_interval,
        }
    }
}
