#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use pollbus_core::{BusError, MemoryStore, Result, SharedStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Memory store that counts reads and can be switched offline.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    offline: AtomicBool,
    fetches: AtomicUsize,
}

impl FlakyStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BusError::StorageUnavailable("cache backend offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SharedStore for FlakyStore {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.fetch(key).await
    }

    async fn store(&self, key: &str, snapshot: Bytes) -> Result<()> {
        self.check()?;
        self.inner.store(key, snapshot).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(key).await
    }
}
