//! Pollbus core: a bounded message log with cursor-based long polling.
//!
//! Clients append short messages to a single shared log and fetch everything
//! after their last seen message with a blocking poll. The log lives in an
//! injected [`SharedStore`] so several coordinators (or processes) see the
//! same state.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pollbus_core::{BusConfig, Cursor, MemoryStore, MessageLog, PollCoordinator};
//!
//! # async fn demo() -> pollbus_core::Result<()> {
//! let config = BusConfig::default();
//! let log = MessageLog::open(Arc::new(MemoryStore::new()), &config).await?;
//! let coordinator = PollCoordinator::new(log.clone(), &config);
//!
//! let first = log.append("hi", "alice").await?;
//! let fresh = coordinator.poll(Cursor::After(first.id)).await?;
//! assert!(fresh.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod log;
pub mod message;
pub mod poll;
pub mod store;
mod writer;

pub use config::{BusConfig, StaleCursorPolicy};
pub use cursor::Cursor;
pub use error::{BusError, Result};
pub use log::MessageLog;
pub use message::{IdSequence, Message, MessageId, WireMessage};
pub use poll::PollCoordinator;
pub use store::{FileStore, MemoryStore, SharedStore};
