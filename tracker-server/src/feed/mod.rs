//! Vehicle position feed client.
//!
//! This module fetches the backend's full position snapshot and turns it
//! into domain vehicles.
//!
//! Key characteristics of the feed:
//! - One request returns **everything**; there is no incremental update
//! - Keys are `"<category>:<id>"`; only tracked categories are vehicles
//! - Field values are often strings, even for coordinates

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{FeedClient, FeedConfig, PositionSource};
pub use convert::{ConvertedSnapshot, convert_position, convert_snapshot, in_category};
pub use error::FeedError;
pub use mock::MockFeed;
pub use types::{PositionDto, RawSnapshot};
