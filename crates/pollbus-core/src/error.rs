//! Error types for the message log and poll coordinator.

use std::io;
use thiserror::Error;

use crate::message::MessageId;

/// Result type for pollbus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors raised by the bus core.
///
/// The transport maps each variant onto a status code; nothing here is
/// silently turned into an empty log.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BusError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed cursor: {0:?}")]
    MalformedCursor(String),

    #[error("Cursor {0} matches no message in the log")]
    StaleCursor(MessageId),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Malformed snapshot under key {key:?}: {source}")]
    MalformedSnapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Message ids exhausted: stored log already reaches {0}")]
    IdsExhausted(MessageId),

    #[error("Log writer has shut down")]
    WriterClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<io::Error> for BusError {
    fn from(err: io::Error) -> Self {
        BusError::StorageUnavailable(err.to_string())
    }
}

impl BusError {
    /// True when the shared store could not be read or written, or handed
    /// back data that does not decode.
    #[inline]
    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            BusError::StorageUnavailable(_)
                | BusError::MalformedSnapshot { .. }
                | BusError::IdsExhausted(_)
        )
    }

    /// True when the caller sent something the bus cannot act on.
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BusError::BadRequest(_) | BusError::MalformedCursor(_) | BusError::StaleCursor(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_storage_failure() {
        let err: BusError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(err.is_storage_failure());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_malformed_snapshot_is_storage_failure() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = BusError::MalformedSnapshot {
            key: "chat_messages".into(),
            source,
        };
        assert!(err.is_storage_failure());
        assert!(err.to_string().contains("chat_messages"));
    }

    #[test]
    fn test_stale_cursor_is_client_error() {
        let err = BusError::StaleCursor(MessageId::new(7));
        assert!(err.is_client_error());
        assert!(err.to_string().contains('7'));
    }
}
