//! Shared key/value storage for serialized log snapshots.
//!
//! The log never keeps its own copy of the messages; every read goes to a
//! [`SharedStore`] so that several coordinators (or processes, with the
//! file backend) observe the same state.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Abstraction for the cache holding log snapshots.
///
/// Implementations report unreachable backends as
/// [`BusError::StorageUnavailable`](crate::BusError::StorageUnavailable);
/// `Ok(None)` strictly means "no entry under this key".
#[async_trait]
pub trait SharedStore: Send + Sync + 'static {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>>;
    async fn store(&self, key: &str, snapshot: Bytes) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}
