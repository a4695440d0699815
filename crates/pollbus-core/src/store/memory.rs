//! In-process snapshot cache.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::SharedStore;
use crate::error::Result;

/// Thread-safe map of snapshots living as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn store(&self, key: &str, snapshot: Bytes) -> Result<()> {
        self.entries.write().insert(key.to_string(), snapshot);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_fetch_delete() {
        let store = MemoryStore::new();
        assert!(store.fetch("k").await.unwrap().is_none());

        store.store("k", Bytes::from_static(b"[]")).await.unwrap();
        assert_eq!(store.fetch("k").await.unwrap().unwrap(), Bytes::from_static(b"[]"));
        assert_eq!(store.len(), 1);

        store.delete("k").await.unwrap();
        assert!(store.fetch("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("never-written").await.unwrap();
    }
}
