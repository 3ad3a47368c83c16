//! Trip identifier parsing.

use super::error::TripIdError;
use super::line::{Line, VehicleKind};

/// Structured fields recovered from a raw trip identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTrip {
    /// First segment of the identifier (e.g. "RA220830").
    pub trip_id: String,
    /// Second segment, the line number.
    pub line: Line,
}

impl ParsedTrip {
    /// Vehicle kind, derived from the line.
    pub fn kind(&self) -> VehicleKind {
        self.line.kind()
    }
}

/// Parse a raw trip identifier of the form `<trip>/<line>/<rest...>`.
///
/// Only the first two segments are inspected; anything after the line is
/// ignored.
///
/// # Examples
///
/// ```
/// use tracker_server::domain::{parse_trip_id, VehicleKind};
///
/// let trip = parse_trip_id("RA220830/24/TP-NBM/DP/07.15__").unwrap();
/// assert_eq!(trip.trip_id, "RA220830");
/// assert_eq!(trip.line.as_str(), "24");
/// assert_eq!(trip.kind(), VehicleKind::Tram);
/// ```
pub fn parse_trip_id(raw: &str) -> Result<ParsedTrip, TripIdError> {
    let mut segments = raw.split('/');

    // split always yields at least one item
    let trip_id = segments.next().unwrap_or_default();
    let line = segments.next().ok_or_else(|| TripIdError::MissingSegment {
        raw: raw.to_string(),
    })?;

    Ok(ParsedTrip {
        trip_id: trip_id.to_string(),
        line: Line::parse(line)?,
    })
}
