//! Live vehicle tracker server.
//!
//! Polls a backend for bus and tram positions and shows them on a map,
//! filtered by the lines the user picks.

pub mod config;
pub mod domain;
pub mod feed;
pub mod poller;
pub mod view;
pub mod web;
