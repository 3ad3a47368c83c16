//! Web layer for the vehicle tracker.
//!
//! Serves the map page and a JSON API over the shared `TrackerView`.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
