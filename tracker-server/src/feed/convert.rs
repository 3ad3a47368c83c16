//! Conversion from feed DTOs to domain types.
//!
//! A snapshot is converted record by record. Records that fail to decode or
//! validate are logged and skipped; they never abort the snapshot.

use tracing::{debug, warn};

use crate::domain::{DomainError, Position, Transportation, parse_trip_id};

use super::types::{PositionDto, RawSnapshot};

/// Result of converting a raw snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedSnapshot {
    /// Vehicles that converted cleanly, in key order.
    pub vehicles: Vec<Transportation>,
    /// Entries in a tracked category that were dropped as malformed.
    pub skipped: usize,
}

/// Convert one position record to a domain vehicle.
///
/// Pure: the same DTO always produces the same vehicle (or error).
pub fn convert_position(dto: &PositionDto) -> Result<Transportation, DomainError> {
    let trip = parse_trip_id(&dto.trip_id)?;
    let position = Position::new(dto.lat, dto.lon)?;

    Ok(Transportation {
        id: dto.id.clone(),
        timestamp: dto.timestamp.clone(),
        side_number: dto.side_number.clone(),
        trip_id: trip.trip_id,
        line: trip.line,
        position,
    })
}

/// Whether a snapshot key (e.g. `"bus:123"`) belongs to one of `categories`.
pub fn in_category(key: &str, categories: &[String]) -> bool {
    key.split_once(':')
        .is_some_and(|(category, _)| categories.iter().any(|c| c == category))
}

/// Convert a raw snapshot, keeping only keys in the tracked categories.
pub fn convert_snapshot(raw: &RawSnapshot, categories: &[String]) -> ConvertedSnapshot {
    let mut result = ConvertedSnapshot::default();

    for (key, value) in raw {
        if !in_category(key, categories) {
            continue;
        }

        if !value.is_object() {
            debug!(key = %key, "Skipping non-position entry");
            result.skipped += 1;
            continue;
        }

        let mut dto: PositionDto = match serde_json::from_value(value.clone()) {
            Ok(dto) => dto,
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping undecodable position");
                result.skipped += 1;
                continue;
            }
        };

        if dto.id.is_empty() {
            dto.id = key.clone();
        }

        match convert_position(&dto) {
            Ok(vehicle) => result.vehicles.push(vehicle),
            Err(e) => {
                warn!(key = %key, trip_id = %dto.trip_id, error = %e, "Skipping invalid position");
                result.skipped += 1;
            }
        }
    }

    result
}
