//! Position feed response DTOs.
//!
//! The feed answers `GET /get_all_data` with one JSON object keyed by
//! `"<category>:<id>"`. Values are whatever the upstream store holds under
//! that key: position hashes for vehicles, but also plain strings and sets
//! for bookkeeping keys. Hash fields arrive as strings, so numeric fields
//! accept both JSON numbers and numeric strings.

use serde::{Deserialize, Deserializer, de};

/// Raw snapshot body, before category filtering.
pub type RawSnapshot = serde_json::Map<String, serde_json::Value>;

/// A single vehicle position record, as sent by the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionDto {
    /// Feed identifier. Missing on some feeds, in which case the snapshot
    /// key is used instead.
    #[serde(default, deserialize_with = "text")]
    pub id: String,

    /// Report time, passed through unparsed.
    #[serde(default, deserialize_with = "text")]
    pub timestamp: String,

    /// Fleet number.
    #[serde(default, alias = "sideNumber", deserialize_with = "text")]
    pub side_number: String,

    /// Raw trip identifier (e.g. "RA220830/24/TP-NBM/DP/07.15__").
    #[serde(alias = "tripId")]
    pub trip_id: String,

    /// Latitude in degrees.
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,

    /// Longitude in degrees.
    #[serde(alias = "lng", deserialize_with = "coordinate")]
    pub lon: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("coordinate {n} out of range"))),
        Scalar::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("coordinate {s:?} is not a number"))),
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Number(n) => n.to_string(),
        Scalar::Text(s) => s,
    })
}
