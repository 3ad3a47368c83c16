//! Tracked vehicle (domain record).

use super::line::{Line, VehicleKind};
use super::position::Position;

/// A bus or tram position, validated and with its trip identifier parsed.
///
/// Records are built once per snapshot and never mutated. The vehicle
/// kind is not stored: it is always derived from [`Transportation::line`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transportation {
    /// Feed identifier (e.g. "bus:123")
    pub id: String,

    /// Position report time, as sent by the feed
    pub timestamp: String,

    /// Fleet number painted on the vehicle
    pub side_number: String,

    /// Trip segment of the raw trip identifier
    pub trip_id: String,

    /// Line the vehicle is running
    pub line: Line,

    /// Reported coordinates
    pub position: Position,
}

impl Transportation {
    /// Bus or tram, from the line number.
    pub fn kind(&self) -> VehicleKind {
        self.line.kind()
    }
}
