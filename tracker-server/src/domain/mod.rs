//! Domain types for the vehicle tracker.
//!
//! This module contains the validated model the rest of the crate works
//! with. Types enforce their invariants at construction time: a `Line` is
//! always numeric, a `Position` is always in range, and a vehicle's kind is
//! always derived from its line.

mod error;
mod line;
mod position;
mod trip;
mod vehicle;

pub use error::{DomainError, TripIdError};
pub use line::{BUS_LINE_THRESHOLD, Line, VehicleKind};
pub use position::Position;
pub use trip::{ParsedTrip, parse_trip_id};
pub use vehicle::Transportation;
