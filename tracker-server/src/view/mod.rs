//! Map view state.
//!
//! Holds what the map page displays and derives it from the latest
//! snapshot:
//!
//! - `selection` - line search text and selected lines
//! - `markers` - the marker layer, icons and viewport
//! - `notifications` - dismissible fetch-failure messages
//! - `state` - `TrackerView`, the container owning all of the above

mod markers;
mod notifications;
mod selection;
mod state;

pub use markers::{
    DEFAULT_ZOOM, FOCUS_ZOOM, IconDescriptor, MapView, Marker, MarkerIcon, ReconcileStats,
    USER_MARKER_ID, Viewport,
};
pub use notifications::{Notification, NotificationConfig, Notifications};
pub use selection::{Selection, distinct_lines};
pub use state::{Applied, FetchOutcome, SharedView, Snapshot, TrackerView};
