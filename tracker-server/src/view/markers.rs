//! Map marker layer and viewport.
//!
//! The marker layer is rebuilt wholesale from the visible vehicles on every
//! update. The viewport is never touched by a rebuild; only explicit user
//! actions (focus on a vehicle, locate me) move it.

use std::collections::BTreeMap;

use crate::domain::{Position, Transportation, VehicleKind};

/// Zoom level of the initial view.
pub const DEFAULT_ZOOM: u8 = 13;

/// Zoom level used when centring on a vehicle or on the user.
pub const FOCUS_ZOOM: u8 = 16;

/// Id of the user's own location marker.
pub const USER_MARKER_ID: &str = "user";

/// Which icon a marker is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    Bus,
    Tram,
    User,
}

/// How to draw an icon, in Leaflet terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDescriptor {
    pub url: &'static str,
    pub size: [u16; 2],
    pub anchor: [u16; 2],
    pub popup_anchor: [i16; 2],
}

const BUS_ICON: IconDescriptor = IconDescriptor {
    url: "/static/icons/bus.svg",
    size: [24, 24],
    anchor: [0, 0],
    popup_anchor: [12, 2],
};

const TRAM_ICON: IconDescriptor = IconDescriptor {
    url: "/static/icons/tram.svg",
    size: [24, 24],
    anchor: [0, 0],
    popup_anchor: [12, 2],
};

const USER_ICON: IconDescriptor = IconDescriptor {
    url: "/static/icons/blue-dot.svg",
    size: [16, 16],
    anchor: [0, 0],
    popup_anchor: [12, 2],
};

impl MarkerIcon {
    /// Icon lookup table.
    pub fn descriptor(self) -> &'static IconDescriptor {
        match self {
            MarkerIcon::Bus => &BUS_ICON,
            MarkerIcon::Tram => &TRAM_ICON,
            MarkerIcon::User => &USER_ICON,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerIcon::Bus => "bus",
            MarkerIcon::Tram => "tram",
            MarkerIcon::User => "user",
        }
    }
}

impl From<VehicleKind> for MarkerIcon {
    fn from(kind: VehicleKind) -> Self {
        match kind {
            VehicleKind::Bus => MarkerIcon::Bus,
            VehicleKind::Tram => MarkerIcon::Tram,
        }
    }
}

/// A marker on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub position: Position,
    pub popup: String,
    pub icon: MarkerIcon,
}

impl Marker {
    /// Marker for a vehicle: popup shows line and trip.
    pub fn for_vehicle(vehicle: &Transportation) -> Self {
        Self {
            id: vehicle.id.clone(),
            position: vehicle.position,
            popup: format!("{} {}", vehicle.line, vehicle.trip_id),
            icon: vehicle.kind().into(),
        }
    }

    /// Marker for the user's own location.
    pub fn for_user(position: Position) -> Self {
        Self {
            id: USER_MARKER_ID.to_string(),
            position,
            popup: "You are here".to_string(),
            icon: MarkerIcon::User,
        }
    }
}

/// Map centre and zoom.
///
/// `revision` increases on every explicit recentre, so a client can tell a
/// requested pan apart from an unchanged view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Position,
    pub zoom: u8,
    pub revision: u64,
}

impl Viewport {
    fn recenter(&mut self, center: Position, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
        self.revision += 1;
    }
}

/// Counts from one reconciliation, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub removed: usize,
    pub added: usize,
}

/// Marker layer plus viewport.
#[derive(Debug, Clone)]
pub struct MapView {
    viewport: Viewport,
    layer: BTreeMap<String, Marker>,
    user: Option<Marker>,
}

impl MapView {
    /// Create an empty map centred on `center`.
    pub fn new(center: Position) -> Self {
        Self {
            viewport: Viewport {
                center,
                zoom: DEFAULT_ZOOM,
                revision: 0,
            },
            layer: BTreeMap::new(),
            user: None,
        }
    }

    /// Replace every vehicle marker with one per vehicle in `vehicles`.
    ///
    /// A later vehicle with a duplicate id replaces the earlier one.
    pub fn reconcile<'a, I>(&mut self, vehicles: I) -> ReconcileStats
    where
        I: IntoIterator<Item = &'a Transportation>,
    {
        let removed = self.layer.len();
        self.layer.clear();

        for vehicle in vehicles {
            self.layer
                .insert(vehicle.id.clone(), Marker::for_vehicle(vehicle));
        }

        ReconcileStats {
            removed,
            added: self.layer.len(),
        }
    }

    /// Centre on a vehicle at the focus zoom.
    pub fn focus(&mut self, vehicle: &Transportation) {
        self.viewport.recenter(vehicle.position, FOCUS_ZOOM);
    }

    /// Show the user's location and centre on it.
    pub fn locate(&mut self, position: Position) {
        self.user = Some(Marker::for_user(position));
        self.viewport.recenter(position, FOCUS_ZOOM);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Vehicle markers, ordered by id.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.layer.values()
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.layer.get(id)
    }

    pub fn marker_count(&self) -> usize {
        self.layer.len()
    }

    pub fn user_marker(&self) -> Option<&Marker> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Line;

    fn center() -> Position {
        Position::new(52.2297, 21.0122).unwrap()
    }

    fn vehicle(id: &str, line: &str, lat: f64) -> Transportation {
        Transportation {
            id: id.to_string(),
            timestamp: "t".to_string(),
            side_number: "1".to_string(),
            trip_id: "RA220830".to_string(),
            line: Line::parse(line).unwrap(),
            position: Position { lat, lng: 21.0 },
        }
    }

    #[test]
    fn icon_lookup() {
        assert_eq!(MarkerIcon::Bus.descriptor().url, "/static/icons/bus.svg");
        assert_eq!(MarkerIcon::Tram.descriptor().size, [24, 24]);
        assert_eq!(MarkerIcon::User.descriptor().size, [16, 16]);
        assert_eq!(MarkerIcon::from(VehicleKind::Bus), MarkerIcon::Bus);
        assert_eq!(MarkerIcon::from(VehicleKind::Tram), MarkerIcon::Tram);
    }

    #[test]
    fn vehicle_marker_contents() {
        let marker = Marker::for_vehicle(&vehicle("bus:1", "24", 52.1));
        assert_eq!(marker.id, "bus:1");
        assert_eq!(marker.popup, "24 RA220830");
        assert_eq!(marker.icon, MarkerIcon::Tram);
        assert_eq!(marker.position, Position { lat: 52.1, lng: 21.0 });
    }

    #[test]
    fn reconcile_replaces_layer() {
        let mut map = MapView::new(center());

        let first = [vehicle("bus:1", "24", 52.1), vehicle("bus:2", "176", 52.2)];
        let stats = map.reconcile(&first);
        assert_eq!(stats, ReconcileStats { removed: 0, added: 2 });

        let second = [vehicle("bus:2", "176", 52.3), vehicle("bus:3", "4", 52.4)];
        let stats = map.reconcile(&second);
        assert_eq!(stats, ReconcileStats { removed: 2, added: 2 });

        assert!(map.marker("bus:1").is_none());
        assert_eq!(map.marker("bus:2").unwrap().position.lat, 52.3);
        assert_eq!(map.marker("bus:3").unwrap().icon, MarkerIcon::Tram);
    }

    #[test]
    fn reconcile_with_nothing_clears() {
        let mut map = MapView::new(center());
        map.reconcile(&[vehicle("bus:1", "24", 52.1)]);
        map.reconcile(std::iter::empty());
        assert_eq!(map.marker_count(), 0);
    }

    #[test]
    fn duplicate_ids_keep_last() {
        let mut map = MapView::new(center());
        map.reconcile(&[vehicle("bus:1", "24", 52.1), vehicle("bus:1", "24", 52.5)]);
        assert_eq!(map.marker_count(), 1);
        assert_eq!(map.marker("bus:1").unwrap().position.lat, 52.5);
    }

    #[test]
    fn reconcile_keeps_viewport() {
        let mut map = MapView::new(center());
        let before = *map.viewport();

        map.reconcile(&[vehicle("bus:1", "24", 52.1)]);
        map.reconcile(&[vehicle("bus:2", "176", 52.9)]);

        assert_eq!(*map.viewport(), before);
    }

    #[test]
    fn focus_recenters_at_fixed_zoom() {
        let mut map = MapView::new(center());
        map.focus(&vehicle("bus:1", "24", 52.1));

        let viewport = map.viewport();
        assert_eq!(viewport.center, Position { lat: 52.1, lng: 21.0 });
        assert_eq!(viewport.zoom, FOCUS_ZOOM);
        assert_eq!(viewport.revision, 1);
    }

    #[test]
    fn locate_adds_user_marker() {
        let mut map = MapView::new(center());
        let here = Position::new(52.0, 20.9).unwrap();
        map.locate(here);

        let user = map.user_marker().unwrap();
        assert_eq!(user.icon, MarkerIcon::User);
        assert_eq!(user.position, here);
        assert_eq!(map.viewport().center, here);
        assert_eq!(map.viewport().revision, 1);
        // The user marker is not part of the vehicle layer
        assert_eq!(map.marker_count(), 0);
    }
}
