//! Handlers for server

pub mod bus;

// Re-export AppState from config
pub use crate::config::AppState;

pub use bus::{get_bus, post_bus, BusForm};
