//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Position, Transportation};
use crate::view::{Marker, Notification, TrackerView, Viewport};

/// A vehicle in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResult {
    /// Feed identifier
    pub id: String,

    /// Trip segment of the trip identifier
    pub trip_id: String,

    /// Line number
    pub line: String,

    /// "bus" or "tram"
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// Reported position
    pub position: Position,

    /// Report time as sent by the feed
    pub timestamp: String,

    /// Fleet number
    pub side_number: String,
}

/// A map marker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerResult {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub popup: String,
    pub icon: &'static str,
    pub icon_url: &'static str,
    pub icon_size: [u16; 2],
    pub icon_anchor: [u16; 2],
    pub popup_anchor: [i16; 2],
}

/// Map centre and zoom.
#[derive(Debug, Serialize)]
pub struct ViewportResult {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
    /// Bumped on each explicit recentre
    pub revision: u64,
}

/// A dismissible error message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResult {
    pub id: u64,
    pub message: String,
    pub status: Option<u16>,
    pub raised_at: String,
}

/// Everything the map page draws.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub markers: Vec<MarkerResult>,
    pub user: Option<MarkerResult>,
    pub viewport: ViewportResult,
    pub search_text: String,
    pub selected_lines: Vec<String>,
    /// Lines matching the search text
    pub lines: Vec<String>,
    pub notifications: Vec<NotificationResult>,
    pub loading: bool,
    pub fetched_at: Option<String>,
}

/// Query for the line list.
#[derive(Debug, Deserialize)]
pub struct LinesQuery {
    /// Search text; defaults to the stored search text
    pub q: Option<String>,
}

/// Line list response.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<String>,
}

/// Vehicle list response.
#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    pub vehicles: Vec<VehicleResult>,
}

/// Query for vehicles of a line near a point.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub line: String,
    pub lat: f64,
    pub lng: f64,
    pub range_km: f64,
}

/// Request to set the search text.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub text: String,
}

/// Request to toggle a line.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub line: String,
}

/// Result of toggling a line.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub line: String,
    pub selected: bool,
    pub selected_lines: Vec<String>,
}

/// Request to show the user's location.
#[derive(Debug, Deserialize)]
pub struct LocateRequest {
    pub lat: f64,
    pub lng: f64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl VehicleResult {
    /// Create from a domain vehicle.
    pub fn from_vehicle(vehicle: &Transportation) -> Self {
        Self {
            id: vehicle.id.clone(),
            trip_id: vehicle.trip_id.clone(),
            line: vehicle.line.to_string(),
            kind: vehicle.kind().as_str(),
            position: vehicle.position,
            timestamp: vehicle.timestamp.clone(),
            side_number: vehicle.side_number.clone(),
        }
    }
}

impl MarkerResult {
    /// Create from a marker, resolving its icon.
    pub fn from_marker(marker: &Marker) -> Self {
        let icon = marker.icon.descriptor();
        Self {
            id: marker.id.clone(),
            lat: marker.position.lat,
            lng: marker.position.lng,
            popup: marker.popup.clone(),
            icon: marker.icon.as_str(),
            icon_url: icon.url,
            icon_size: icon.size,
            icon_anchor: icon.anchor,
            popup_anchor: icon.popup_anchor,
        }
    }
}

impl ViewportResult {
    pub fn from_viewport(viewport: &Viewport) -> Self {
        Self {
            lat: viewport.center.lat,
            lng: viewport.center.lng,
            zoom: viewport.zoom,
            revision: viewport.revision,
        }
    }
}

impl NotificationResult {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message.clone(),
            status: notification.status,
            raised_at: notification.raised_at.to_rfc3339(),
        }
    }
}

impl ViewResponse {
    /// Snapshot the whole view.
    pub fn from_view(view: &TrackerView) -> Self {
        let map = view.map();
        Self {
            markers: map.markers().map(MarkerResult::from_marker).collect(),
            user: map.user_marker().map(MarkerResult::from_marker),
            viewport: ViewportResult::from_viewport(map.viewport()),
            search_text: view.selection().search_text().to_string(),
            selected_lines: view
                .selection()
                .selected()
                .iter()
                .map(|l| l.to_string())
                .collect(),
            lines: view.visible_lines().iter().map(|l| l.to_string()).collect(),
            notifications: view
                .notifications()
                .active()
                .iter()
                .map(|n| NotificationResult::from_notification(n))
                .collect(),
            loading: view.is_loading(),
            fetched_at: view.snapshot().fetched_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Line;
    use crate::view::{MarkerIcon, NotificationConfig};

    fn tram() -> Transportation {
        Transportation {
            id: "bus:1".into(),
            timestamp: "t".into(),
            side_number: "5".into(),
            trip_id: "RA220830".into(),
            line: Line::parse("24").unwrap(),
            position: Position { lat: 52.1, lng: 21.0 },
        }
    }

    #[test]
    fn vehicle_json_shape() {
        let json = serde_json::to_value(VehicleResult::from_vehicle(&tram())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "bus:1",
                "tripId": "RA220830",
                "line": "24",
                "type": "tram",
                "position": {"lat": 52.1, "lng": 21.0},
                "timestamp": "t",
                "sideNumber": "5",
            })
        );
    }

    #[test]
    fn marker_json_includes_icon() {
        let marker = Marker::for_vehicle(&tram());
        let json = serde_json::to_value(MarkerResult::from_marker(&marker)).unwrap();

        assert_eq!(json["icon"], "tram");
        assert_eq!(json["iconUrl"], MarkerIcon::Tram.descriptor().url);
        assert_eq!(json["iconSize"], serde_json::json!([24, 24]));
        assert_eq!(json["popup"], "24 RA220830");
    }

    #[test]
    fn empty_view_response() {
        let view = TrackerView::new(
            Position { lat: 52.2, lng: 21.0 },
            &NotificationConfig::default(),
        );
        let response = ViewResponse::from_view(&view);

        assert!(response.markers.is_empty());
        assert!(response.user.is_none());
        assert_eq!(response.viewport.zoom, crate::view::DEFAULT_ZOOM);
        assert_eq!(response.viewport.revision, 0);
        assert!(!response.loading);
        assert!(response.fetched_at.is_none());
    }
}
