//! Line number and vehicle kind types.

use std::cmp::Ordering;
use std::fmt;
use std::num::IntErrorKind;

use super::error::TripIdError;

/// Line numbers at or above this value are served by buses; lower ones by trams.
pub const BUS_LINE_THRESHOLD: i64 = 100;

/// The kind of vehicle running a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleKind {
    Bus,
    Tram,
}

impl VehicleKind {
    /// Lowercase name used on the wire and in CSS classes.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleKind::Bus => "bus",
            VehicleKind::Tram => "tram",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated line number (e.g. "24", "176").
///
/// The textual form is kept (without surrounding whitespace) so that "024"
/// and "24" stay distinct lines, while the parsed number decides the
/// vehicle kind. A `Line` can only be built from text that parses as an
/// integer, so [`Line::kind`] is total. Integers too large for `i64`
/// saturate, which keeps their side of the threshold.
///
/// # Examples
///
/// ```
/// use tracker_server::domain::{Line, VehicleKind};
///
/// let tram = Line::parse("24").unwrap();
/// assert_eq!(tram.kind(), VehicleKind::Tram);
///
/// let bus = Line::parse("176").unwrap();
/// assert_eq!(bus.kind(), VehicleKind::Bus);
///
/// // Non-numeric lines are rejected rather than guessed
/// assert!(Line::parse("N01").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Line {
    name: String,
    number: i64,
}

impl Line {
    /// Parse a line from its textual form.
    pub fn parse(s: &str) -> Result<Self, TripIdError> {
        let name = s.trim();
        let number = match name.parse::<i64>() {
            Ok(n) => n,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => {
                    return Err(TripIdError::TypeMismatch {
                        line: s.to_string(),
                    });
                }
            },
        };

        Ok(Line {
            name: name.to_string(),
            number,
        })
    }

    /// Returns the line as received.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Returns the numeric value of the line, saturated to the `i64` range.
    pub fn number(&self) -> i64 {
        self.number
    }

    /// The kind of vehicle serving this line.
    pub fn kind(&self) -> VehicleKind {
        if self.number >= BUS_LINE_THRESHOLD {
            VehicleKind::Bus
        } else {
            VehicleKind::Tram
        }
    }
}

// Numeric order first so that "4" sorts before "24" in line pickers.
impl Ord for Line {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Line {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({})", self.name)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
