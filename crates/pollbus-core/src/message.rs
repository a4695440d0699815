//! Message records and the id sequence that orders them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BusError, Result};

/// Unique, strictly increasing message identifier.
///
/// Ids are minted by an [`IdSequence`]; the wall clock never decides order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored chat message.
///
/// Serialized into the shared snapshot as `{"m", "u", "t", "at"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "t")]
    pub id: MessageId,
    #[serde(rename = "m")]
    pub text: String,
    #[serde(rename = "u")]
    pub author: String,
    /// Informational only.
    #[serde(rename = "at", default = "unix_epoch")]
    pub created_at: DateTime<Utc>,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Message {
    pub fn new(id: MessageId, text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            author: author.into(),
            created_at: Utc::now(),
        }
    }
}

/// The record a poll hands back to clients: `{"m": text, "u": author, "t": id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub m: String,
    pub u: String,
    pub t: MessageId,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            m: message.text.clone(),
            u: message.author.clone(),
            t: message.id,
        }
    }
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        Self {
            m: message.text,
            u: message.author,
            t: message.id,
        }
    }
}

/// Counter that mints message ids.
///
/// The next id is never below `newest_stored + 1`, so ids keep increasing
/// after a restart from a persisted snapshot, and never below the last id
/// this sequence handed out, so a `clear` does not recycle them.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start after the newest id found in an existing snapshot.
    pub fn resume_after(newest: Option<MessageId>) -> Result<Self> {
        let mut seq = Self::new();
        seq.observe(newest)?;
        Ok(seq)
    }

    /// Mint the next id, skipping past anything already stored.
    ///
    /// Fails without touching the counter when the stored log has used up
    /// the id space, so a later mint can succeed once the store is cleared.
    pub fn mint(&mut self, newest_stored: Option<MessageId>) -> Result<MessageId> {
        self.observe(newest_stored)?;
        let id = MessageId(self.next);
        self.next = self.next.checked_add(1).ok_or(BusError::IdsExhausted(id))?;
        Ok(id)
    }

    fn observe(&mut self, newest: Option<MessageId>) -> Result<()> {
        if let Some(newest) = newest {
            let after = newest.0.checked_add(1).ok_or(BusError::IdsExhausted(newest))?;
            self.next = self.next.max(after);
        }
        Ok(())
    }
}
