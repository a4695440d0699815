//! Client for a pollbus server.
//!
//! [`BusClient`] wraps the single `/chat` endpoint: posting, one-shot polls,
//! dump and clear, plus [`BusClient::subscribe`] which keeps polling and
//! streams every new message through a channel.

pub mod client;
pub mod config;
pub mod error;
pub mod subscription;

pub use client::BusClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
