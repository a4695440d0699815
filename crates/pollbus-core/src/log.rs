//! The bounded, ordered message log.
//!
//! Reads always go through the shared store. Writes are funnelled through a
//! single writer task (see [`crate::writer`]) so concurrent appends cannot
//! overwrite each other's read-modify-write cycle.

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::{BusConfig, StaleCursorPolicy};
use crate::cursor::Cursor;
use crate::error::{BusError, Result};
use crate::message::{IdSequence, Message};
use crate::store::SharedStore;
use crate::writer::{self, WriteCommand};

/// Encodes and decodes the log under one key of a [`SharedStore`].
pub(crate) struct SnapshotStore {
    store: Arc<dyn SharedStore>,
    key: String,
}

impl SnapshotStore {
    pub(crate) fn new(store: Arc<dyn SharedStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub(crate) async fn load(&self) -> Result<Vec<Message>> {
        match self.store.fetch(&self.key).await? {
            None => Ok(Vec::new()),
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| BusError::MalformedSnapshot {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }

    pub(crate) async fn save(&self, messages: &[Message]) -> Result<()> {
        let json = serde_json::to_vec(messages).map_err(|source| BusError::MalformedSnapshot {
            key: self.key.clone(),
            source,
        })?;
        self.store.store(&self.key, Bytes::from(json)).await
    }

    pub(crate) async fn erase(&self) -> Result<()> {
        self.store.delete(&self.key).await
    }
}

/// Handle on the shared message log.
///
/// Cloning is cheap; all clones talk to the same writer task, which stops
/// once the last handle is dropped.
#[derive(Clone)]
pub struct MessageLog {
    snapshots: Arc<SnapshotStore>,
    capacity: usize,
    stale_cursor: StaleCursorPolicy,
    writer: mpsc::Sender<WriteCommand>,
}

impl MessageLog {
    /// Open the log stored under `config.store_key`.
    ///
    /// Must be called from within a Tokio runtime: the writer task is
    /// spawned here. Fails if the store cannot be read.
    pub async fn open(store: Arc<dyn SharedStore>, config: &BusConfig) -> Result<Self> {
        config.validate()?;

        let snapshots = Arc::new(SnapshotStore::new(store, config.store_key.clone()));
        let mut existing = snapshots.load().await?;

        if existing.len() > config.capacity {
            let overflow = existing.len() - config.capacity;
            warn!(
                "Snapshot {:?} holds {} messages, trimming {} to capacity {}",
                config.store_key,
                existing.len(),
                overflow,
                config.capacity
            );
            existing.drain(..overflow);
            snapshots.save(&existing).await?;
        }

        let ids = IdSequence::resume_after(existing.last().map(|m| m.id))?;
        let writer = writer::spawn(snapshots.clone(), config.capacity, ids);

        info!(
            "MessageLog {:?} opened with {} messages (capacity {})",
            config.store_key,
            existing.len(),
            config.capacity
        );

        Ok(Self {
            snapshots,
            capacity: config.capacity,
            stale_cursor: config.stale_cursor,
            writer,
        })
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a message, evicting the oldest entries beyond capacity.
    ///
    /// Returns once the new snapshot has been written to the store.
    pub async fn append(
        &self,
        text: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Message> {
        let (reply, response) = oneshot::channel();
        self.writer
            .send(WriteCommand::Append {
                text: text.into(),
                author: author.into(),
                reply,
            })
            .await
            .map_err(|_| BusError::WriterClosed)?;
        response.await.map_err(|_| BusError::WriterClosed)?
    }

    /// Drop the persisted snapshot.
    pub async fn clear(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.writer
            .send(WriteCommand::Clear { reply })
            .await
            .map_err(|_| BusError::WriterClosed)?;
        response.await.map_err(|_| BusError::WriterClosed)?
    }

    /// The whole log, oldest first, read fresh from the store.
    pub async fn snapshot(&self) -> Result<Vec<Message>> {
        self.snapshots.load().await
    }

    /// Messages newer than `cursor`.
    ///
    /// `Some(vec![])` means the cursor is the newest message (caught up);
    /// `None` means there is nothing to resume from yet.
    pub async fn messages_since(&self, cursor: &Cursor) -> Result<Option<Vec<Message>>> {
        let messages = self.snapshot().await?;
        suffix_after(messages, cursor, self.stale_cursor)
    }
}

/// Cut `messages` down to what a client holding `cursor` has not seen.
pub fn suffix_after(
    mut messages: Vec<Message>,
    cursor: &Cursor,
    policy: StaleCursorPolicy,
) -> Result<Option<Vec<Message>>> {
    let Cursor::After(seen) = cursor else {
        return Ok(non_empty(messages));
    };

    match messages.iter().rposition(|m| cursor.matches(m.id)) {
        Some(pos) => Ok(Some(messages.split_off(pos + 1))),
        None => match policy {
            StaleCursorPolicy::Resync => {
                debug!("Cursor {} is stale, resyncing from the start", seen);
                Ok(non_empty(messages))
            }
            StaleCursorPolicy::Reject => Err(BusError::StaleCursor(*seen)),
        },
    }
}

fn non_empty(messages: Vec<Message>) -> Option<Vec<Message>> {
    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}
