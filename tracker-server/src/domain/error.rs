//! Domain error types.
//!
//! These errors represent malformed position records. They are distinct
//! from feed/network errors: a domain error rejects one record, never a
//! whole snapshot.

/// Errors from parsing a raw trip identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripIdError {
    /// Fewer than two slash-delimited segments
    #[error("trip id {raw:?} has no line segment")]
    MissingSegment { raw: String },

    /// Line segment is not an integer
    #[error("line {line:?} is not numeric")]
    TypeMismatch { line: String },
}

/// Errors converting a position record into a domain vehicle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Trip identifier could not be parsed
    #[error("invalid trip id: {0}")]
    TripId(#[from] TripIdError),

    /// Coordinate is not finite or out of range
    #[error("invalid {axis} coordinate: {value}")]
    InvalidCoordinate { axis: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TripIdError::MissingSegment {
            raw: "RA220830".into(),
        };
        assert_eq!(err.to_string(), "trip id \"RA220830\" has no line segment");

        let err = TripIdError::TypeMismatch { line: "N01".into() };
        assert_eq!(err.to_string(), "line \"N01\" is not numeric");

        let err = DomainError::from(TripIdError::TypeMismatch { line: "x".into() });
        assert_eq!(err.to_string(), "invalid trip id: line \"x\" is not numeric");

        let err = DomainError::InvalidCoordinate {
            axis: "latitude",
            value: 91.0,
        };
        assert_eq!(err.to_string(), "invalid latitude coordinate: 91");
    }
}
